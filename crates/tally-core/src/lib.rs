// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tally cost tracker.
//!
//! This crate provides the error taxonomy and common types used throughout
//! the Tally workspace. It performs no I/O of its own.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TallyError;
pub use types::{CallUsage, DEFAULT_ORG_ID};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_error_has_all_variants() {
        // Verify all 5 error variants exist and can be constructed.
        let _config = TallyError::Config("test".into());
        let _model = TallyError::UnsupportedModel {
            model: "gpt-99".into(),
        };
        let _count = TallyError::InvalidTokenCount {
            message: "tokens_in must be non-negative".into(),
        };
        let _storage = TallyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _response = TallyError::UnrecognizedResponse {
            message: "no usage field".into(),
        };
    }

    #[test]
    fn error_messages_name_the_offender() {
        let err = TallyError::UnsupportedModel {
            model: "not-a-real-model".into(),
        };
        assert!(err.to_string().contains("not-a-real-model"));

        let err = TallyError::InvalidTokenCount {
            message: "tokens_out was -1".into(),
        };
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn call_usage_serialization_round_trip() {
        let usage = CallUsage {
            model: "gpt-4o-mini".into(),
            tokens_in: 250,
            tokens_out: 125,
        };
        let json = serde_json::to_string(&usage).expect("should serialize");
        let parsed: CallUsage = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(usage, parsed);
    }
}
