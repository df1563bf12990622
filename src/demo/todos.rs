//! Todo list kept by a plain closure reducer.

use serde::{Deserialize, Serialize};

use crate::engine::{reducer_fn, Action, Reducer, TransitionError};

pub const ADD_TODO: &str = "ADD_TODO";
pub const REMOVE_TODO: &str = "REMOVE_TODO";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodosState {
    pub todos: Vec<String>,
}

/// `ADD_TODO` takes the text (blank text is ignored), `REMOVE_TODO` the
/// index to drop (out of range is ignored). A payload of the wrong shape
/// fails the dispatch.
pub fn todos_reducer() -> impl Reducer<State = TodosState> {
    reducer_fn(TodosState::default(), reduce_todos)
}

fn reduce_todos(
    state: &TodosState,
    action: &Action,
) -> Result<Option<TodosState>, TransitionError> {
    Ok(match action.action_type().as_str() {
        ADD_TODO => {
            let text: String = action.decode_payload()?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            let mut todos = state.todos.clone();
            todos.push(text);
            Some(TodosState { todos })
        }
        REMOVE_TODO => {
            let index: usize = action.decode_payload()?;
            if index >= state.todos.len() {
                return Ok(None);
            }
            let todos = state
                .todos
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, todo)| todo.clone())
                .collect();
            Some(TodosState { todos })
        }
        _ => None,
    })
}
