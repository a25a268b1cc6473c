pub use std::collections::BTreeMap;

// Generate labels or annotations for a k8s object, using klabel!("label1" => "value1", ...) syntax;
// unlike the kube-style label helpers this always returns a (possibly empty) map, since fixture
// metadata never distinguishes between "absent" and "empty".
#[macro_export]
macro_rules! klabel {
    () => {
        $crate::macros::BTreeMap::<String, String>::new()
    };
    ($($key:expr => $val:expr),+$(,)?) => {
        $crate::macros::BTreeMap::from([$(($key.to_string(), $val.to_string())),+])
    };
}

pub use klabel;

// Kubernetes represents most enumerated fields as bare strings; this generates a Copy enum that
// (de)serializes to exactly those strings, along with Display and a FromStr that reports bad input
// as a ValidationError naming the enum.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, ::serde::Deserialize, ::serde::Serialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::ValidationError;

            fn from_str(s: &str) -> Result<$name, Self::Err> {
                $name::ALL.iter().find(|v| v.as_str().eq_ignore_ascii_case(s)).copied().ok_or_else(|| {
                    let allowed: Vec<_> = $name::ALL.iter().map(|v| v.as_str()).collect();
                    $crate::errors::ValidationError::new(
                        stringify!($name),
                        format!("unrecognized value {s:?}, expected one of {}", allowed.join(", ")),
                    )
                })
            }
        }
    };
}

pub(crate) use string_enum;
