//! Call-site attribution
//!
//! [`locate`] walks the stack from the logging call towards `main` and returns
//! the first frame that belongs neither to this crate's emission path nor to a
//! function registered with [`mark_helper`].
//!
//! The helper registry is the only process-wide mutable state in the crate. It
//! only ever grows and is shared by all threads.

use dashmap::DashSet;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

/// Maximum number of candidate frames examined before giving up
pub const MAX_CALLER_DEPTH: usize = 10;

const PLACEHOLDER: &str = "<unknown>";

const MARK_HELPER: &str = concat!(module_path!(), "::mark_helper");

const LOCATE: &str = concat!(module_path!(), "::locate");

// Emission path between the user's call and `locate`
const INTERNAL_PREFIXES: [&str; 5] = [
    LOCATE,
    "backtrace::",
    concat!(env!("CARGO_CRATE_NAME"), "::core::logger::Logger"),
    concat!(env!("CARGO_CRATE_NAME"), "::bridge::LineBridge"),
    "std::io::",
];

static HELPERS: Lazy<DashSet<Box<str>>> = Lazy::new(DashSet::new);

/// Source location of a log call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CallerInfo {
    /// False when caller tracing was disabled for the event
    pub defined: bool,
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl CallerInfo {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            defined: true,
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Record used when the walk ran out of frames or hit the depth bound.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER, 0, PLACEHOLDER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.defined && self.line == 0 && self.file == PLACEHOLDER && self.function == PLACEHOLDER
    }
}

impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.defined {
            return Ok(());
        }
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Exclude the calling function from call-site attribution.
///
/// Call it at the top of a wrapper that logs on behalf of its own caller.
/// Registration is idempotent, but every call walks and symbolizes the
/// stack, so keep it off hot paths.
#[inline(never)]
pub fn mark_helper() {
    let mut seen_self = false;
    let mut registered = false;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if registered {
                return;
            }
            let Some(name) = symbol_name(symbol) else {
                return;
            };
            if name.starts_with(MARK_HELPER) {
                seen_self = true;
                return;
            }
            if !seen_self || name.starts_with("backtrace::") {
                return;
            }
            if !HELPERS.contains(name.as_str()) {
                HELPERS.insert(name.into_boxed_str());
            }
            registered = true;
        });
        !registered
    });
}

/// Whether `function` was registered through [`mark_helper`].
pub fn is_helper(function: &str) -> bool {
    HELPERS.contains(function)
}

/// Number of registered helper functions
pub fn helper_count() -> usize {
    HELPERS.len()
}

/// Find the first frame outside the logger and the registered helpers.
///
/// Frames of the emission path are skipped first. After that, at most
/// [`MAX_CALLER_DEPTH`] frames are examined; exhausting the bound (or the
/// stack) yields [`CallerInfo::placeholder`].
#[inline(never)]
pub(crate) fn locate() -> CallerInfo {
    let mut found: Option<CallerInfo> = None;
    let mut seen_self = false;
    let mut past_internal = false;
    let mut examined = 0usize;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() || examined >= MAX_CALLER_DEPTH {
                return;
            }
            let name = symbol_name(symbol);
            if !seen_self {
                // unwinder frames come first
                seen_self = name.as_deref().is_some_and(|n| n.starts_with(LOCATE));
                return;
            }
            if !past_internal {
                if name.as_deref().is_some_and(is_internal_frame) {
                    return;
                }
                past_internal = true;
            }
            examined += 1;
            let Some(name) = name else {
                return;
            };
            if HELPERS.contains(name.as_str()) {
                return;
            }
            let file = symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            let line = symbol.lineno().unwrap_or(0);
            found = Some(CallerInfo::new(file, line, name));
        });
        found.is_none() && examined < MAX_CALLER_DEPTH
    });

    found.unwrap_or_else(CallerInfo::placeholder)
}

fn symbol_name(symbol: &backtrace::Symbol) -> Option<String> {
    let name = symbol.name()?;
    let text = format!("{:#}", name);
    Some(text.trim_start_matches('<').to_string())
}

fn is_internal_frame(name: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
