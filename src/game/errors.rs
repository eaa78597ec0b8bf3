use thiserror::Error;

/// Recoverable rule violations. Reported back to the caller; never end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Inventory or equip operation on an item the character does not hold.
    #[error("you don't have {0}")]
    NotOwned(String),

    /// Equip, install or quest acceptance below the required level.
    #[error("requires level {required} (you are level {actual})")]
    LevelTooLow { required: u32, actual: u32 },

    #[error("quest already in progress: {0}")]
    AlreadyActive(String),

    #[error("quest already finished: {0}")]
    AlreadyTerminal(String),

    /// Not enough energy or credits.
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        needed: u32,
        available: u32,
    },

    #[error("quest not in progress: {0}")]
    NotInProgress(String),

    #[error("{0} cannot be consumed")]
    NotConsumable(String),

    #[error("{0} is the wrong kind of item for that")]
    WrongItemType(String),

    #[error("nothing equipped in slot {0}")]
    EmptySlot(String),

    #[error("no such quest: {0}")]
    UnknownQuest(String),

    #[error("quest {quest} has no objective #{index}")]
    NoSuchObjective { quest: String, index: usize },

    #[error("no such item: {0}")]
    UnknownItem(String),

    #[error("no such recipe: {0}")]
    UnknownRecipe(String),

    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },

    #[error("{0} is locked; a keycard is required")]
    Locked(String),

    #[error("there is no shop here")]
    NoShopHere,

    #[error("no current location")]
    NoLocation,
}

/// Errors from the template source and the snapshot sink.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around IO errors (directory creation, file reads, locking).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON encode/decode errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A template file exists but cannot be parsed.
    #[error("malformed template {path}: {reason}")]
    MalformedTemplate { path: String, reason: String },

    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// Snapshot written by an incompatible version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}
