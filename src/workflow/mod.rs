pub mod view_state;

pub use view_state::{
    transition, ContextPanel, GenerationDetails, UiState, ViewEvent, ViewState,
};
