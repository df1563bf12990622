//! Actions: immutable requests to change state.

use std::borrow::Borrow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{StoreError, TransitionError};

/// Type of the action the store dispatches to itself on construction.
/// The `@@` prefix is reserved; slices cannot be named into it.
pub const INIT_ACTION_TYPE: &str = "@@slicestore/INIT";

/// Opaque action identifier, compared by exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(String);

impl ActionType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `slice/key`, the type a slice compiles for one of its handlers.
    pub fn scoped(slice: &str, key: &str) -> Self {
        Self(format!("{slice}/{key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ActionType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// `{ type, payload? }`. Fields are private so an action cannot change
/// after it has been built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Action {
    pub fn new(action_type: impl Into<ActionType>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
        }
    }

    pub fn with_payload(action_type: impl Into<ActionType>, payload: Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Some(payload),
        }
    }

    /// Serializes `payload` into a new action.
    pub fn encode<P: Serialize + ?Sized>(
        action_type: impl Into<ActionType>,
        payload: &P,
    ) -> Result<Self, StoreError> {
        let payload = serde_json::to_value(payload).map_err(StoreError::Payload)?;
        Ok(Self::with_payload(action_type, payload))
    }

    pub(crate) fn init() -> Self {
        Self::new(INIT_ACTION_TYPE)
    }

    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn is(&self, action_type: &str) -> bool {
        self.action_type.as_str() == action_type
    }

    /// Decodes the payload as `P`. A missing payload decodes from `null`,
    /// which suits `()` and `Option<T>` payloads.
    pub fn decode_payload<P: DeserializeOwned>(&self) -> Result<P, TransitionError> {
        let decoded = match &self.payload {
            Some(value) => P::deserialize(value),
            None => P::deserialize(&Value::Null),
        };
        decoded.map_err(|source| TransitionError::Payload {
            action_type: self.action_type.clone(),
            source,
        })
    }
}

/// A closed set of action kinds a hand-written reducer understands.
///
/// Parsing happens once per dispatch; the reducer then matches over the
/// enum exhaustively instead of comparing type strings.
pub trait Intent: Sized + Send + 'static {
    /// `Ok(None)` means the action is not one of ours and must be ignored.
    fn from_action(action: &Action) -> Result<Option<Self>, TransitionError>;

    /// Action types this intent set claims, used for collision checks.
    fn action_types() -> Vec<ActionType> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_field_is_named_type_on_the_wire() {
        let action = Action::with_payload("multiplier/multiply", json!(5));
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(encoded, json!({"type": "multiplier/multiply", "payload": 5}));
    }

    #[test]
    fn payload_is_optional_when_parsing() {
        let action: Action = serde_json::from_str(r#"{"type":"increment"}"#).unwrap();
        assert!(action.is("increment"));
        assert!(action.payload().is_none());
    }

    #[test]
    fn missing_payload_decodes_as_unit() {
        let action = Action::new("counter/increment");
        let unit: () = action.decode_payload().unwrap();
        assert_eq!(unit, ());
        let maybe: Option<i64> = action.decode_payload().unwrap();
        assert_eq!(maybe, None);
    }

    #[test]
    fn wrong_payload_shape_is_a_transition_error() {
        let action = Action::with_payload("multiplier/multiply", json!("five"));
        let err = action.decode_payload::<i64>().unwrap_err();
        assert!(matches!(err, TransitionError::Payload { .. }));
        assert!(err.to_string().contains("multiplier/multiply"));
    }

    #[test]
    fn scoped_type_joins_with_slash() {
        assert_eq!(ActionType::scoped("counter", "increment").as_str(), "counter/increment");
    }
}
