//! Typed identifier spaces.
//!
//! Three namespaces meet in a run: net names from the synthesized netlist, instance names shared by
//! the netlist and the layout, and hierarchical signal paths from the waveform dump. They are kept
//! apart as distinct types and converted only through the functions below.

use std::{borrow::Borrow, fmt};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// A net name in the netlist namespace (one name per bit).
    NetName
);

string_id!(
    /// A cell instance name, shared by the netlist and the layout.
    InstanceName
);

string_id!(
    /// A fully qualified waveform signal path (`tb.uut.net`).
    SignalPath
);

impl NetName {
    /// Name for bit `bit` of a net-name entry that is `width` bits wide.
    ///
    /// Single-bit entries keep their bare name; wider entries are split into `name[i]`.
    pub fn for_bit(base: &str, bit: usize, width: usize) -> Self {
        if width <= 1 {
            Self::new(base)
        } else {
            Self(format!("{base}[{bit}]"))
        }
    }
}

impl SignalPath {
    /// Map a waveform path into the netlist namespace.
    ///
    /// Returns `None` when the path is outside the design scope `prefix`. Escaped-identifier
    /// backslashes and trailing whitespace are dropped, which is how escaped names appear after
    /// synthesis.
    pub fn to_net_name(&self, prefix: &str) -> Option<NetName> {
        let rest = self.0.strip_prefix(prefix)?;
        let cleaned: String = rest.chars().filter(|c| *c != '\\').collect();
        let cleaned = cleaned.trim_end();
        if cleaned.is_empty() {
            return None;
        }
        Some(NetName::new(cleaned))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;
