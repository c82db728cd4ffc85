//! Respondent identity: the token that namespaces a respondent's stored
//! form data.

use super::*;
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Primary identifier slot, written by the survey entry page.
pub const USER_ID_KEY: &str = "user_id";
/// Session token slot, only inspected by [`confirm_identity_configured`].
pub const SESSION_KEY: &str = "session";
/// Fallback slot holding a generated temporary identifier.
pub const APOS_PID_KEY: &str = "apos_pid";

const TEMP_ID_PREFIX: &str = "temp_";
const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

/// Resolves the identity token, generating and persisting a temporary one
/// when the storage scope has none.
pub struct IdentityResolver {
    clock: Box<dyn Clock>,
    rng_state: u64,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("now_ms", &self.clock.now_ms())
            .field("rng_state", &self.rng_state)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            rng_state: 0x9E37_79B9_7F4A_7C15,
        }
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng_state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Returns `user_id` when set, else the stored temporary id, else a
    /// fresh `temp_<ms>_<suffix>` that is written to the fallback slot.
    pub fn resolve(&mut self, store: &mut dyn KeyValueStore, console: &mut Console) -> String {
        if let Some(user_id) = non_empty(store.get(USER_ID_KEY)) {
            return user_id;
        }
        if let Some(temp_id) = non_empty(store.get(APOS_PID_KEY)) {
            return temp_id;
        }

        let temp_id = format!(
            "{TEMP_ID_PREFIX}{}_{}",
            self.clock.now_ms(),
            self.next_suffix()
        );
        store.set(APOS_PID_KEY, &temp_id);
        console.warn(format!(
            "{USER_ID_KEY} is not set; using temporary id {temp_id}"
        ));
        temp_id
    }

    fn next_suffix(&mut self) -> String {
        let mut n = self.next_random_u64() % 36u64.pow(SUFFIX_LEN as u32);
        let mut out = [b'0'; SUFFIX_LEN];
        for slot in out.iter_mut().rev() {
            *slot = BASE36[(n % 36) as usize];
            n /= 36;
        }
        out.iter().map(|b| *b as char).collect()
    }

    fn next_random_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = if x == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { x };
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

pub fn resolve_identity(
    store: &mut dyn KeyValueStore,
    resolver: &mut IdentityResolver,
    console: &mut Console,
) -> String {
    resolver.resolve(store, console)
}

/// Warns when the entry page has not configured the respondent. Returns
/// whether `user_id` is present. Never writes storage.
pub fn confirm_identity_configured(store: &dyn KeyValueStore, console: &mut Console) -> bool {
    let Some(user_id) = non_empty(store.get(USER_ID_KEY)) else {
        console.warn(format!(
            "{USER_ID_KEY} is not set; start the survey from the entry page"
        ));
        return false;
    };
    let session = non_empty(store.get(SESSION_KEY));
    if session.is_none() {
        console.warn(format!(
            "{SESSION_KEY} is not set; start the survey from the entry page"
        ));
    }
    console.info(format!(
        "respondent: user_id={user_id} session={}",
        session.as_deref().unwrap_or("-")
    ));
    true
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
