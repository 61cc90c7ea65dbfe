//! Generates the error enums returned by store ports.
//!
//! Every variant carries named fields and renders through `thiserror`. Each
//! variant also gets a snake_case constructor taking `impl Into<_>` for its
//! fields, so adapters can write `SessionStoreError::query(err.to_string())`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum CredentialStoreError {
            Unreachable { message: String } => "store unreachable: {message}",
            Locked { username: String, attempts: u32 } => "{username} locked after {attempts} attempts",
        }
    }

    #[test]
    fn constructor_converts_str_fields() {
        let err = CredentialStoreError::unreachable("timeout");
        assert_eq!(
            err,
            CredentialStoreError::Unreachable {
                message: "timeout".to_owned()
            }
        );
        assert_eq!(err.to_string(), "store unreachable: timeout");
    }

    #[test]
    fn constructor_orders_mixed_fields_as_declared() {
        let err = CredentialStoreError::locked("jdoe", 3_u32);
        assert_eq!(err.to_string(), "jdoe locked after 3 attempts");
    }
}
