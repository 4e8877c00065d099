use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("deck runtime has stopped")]
    Closed,

    #[error(transparent)]
    Deck(#[from] mcp360_core::DeckError),

    #[error("timed out waiting for slate {slate} to settle")]
    NavigationTimeout { slate: usize },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
