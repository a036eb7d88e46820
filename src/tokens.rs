use serde::{Deserialize, Serialize};

pub const INDEX_PREFIX: &str = "index";
pub const KEY_PREFIX: &str = "_key";

/// Names derived from one loop site id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteTokens {
    pub id: u32,
    pub index_name: String,
    pub key_token: String,
}

/// Issues loop site ids in discovery order.
///
/// The allocator is owned by the caller and threaded through the pass, so two
/// compilations starting from the same value produce the same names.
#[derive(Debug, Clone, Default)]
pub struct TokenAllocator {
    next: u32,
}

impl TokenAllocator {
    pub fn new() -> Self {
        TokenAllocator::default()
    }

    pub fn starting_at(next: u32) -> Self {
        TokenAllocator { next }
    }

    pub fn allocate(&mut self) -> SiteTokens {
        let id = self.next;
        self.next += 1;
        SiteTokens {
            id,
            index_name: format!("{}{}", INDEX_PREFIX, id),
            key_token: format!("{}{}", KEY_PREFIX, id),
        }
    }

    /// The id the next allocation will return.
    pub fn peek(&self) -> u32 {
        self.next
    }
}
