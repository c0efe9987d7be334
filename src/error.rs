//! Error types for the liquidation engine.
//!
//! Every failure is terminal for the call that triggered it and leaves the
//! engine state untouched. Variants are kept distinct so that callers can tell
//! a transient settlement problem apart from an order that can never succeed.

use thiserror::Error;

/// Result type alias for liquidation engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the liquidation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Order Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Order record could not be parsed or carries an unsupported field
    #[error("Malformed order: {0}")]
    MalformedOrder(String),

    /// Signature is not a valid canonical secp256k1 signature for the order
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Recovered signing identity differs from the claimed signatory
    #[error("Signer mismatch: expected {expected}, got {got}")]
    SignerMismatch {
        /// Claimed signatory
        expected: String,
        /// Recovered identity
        got: String,
    },

    /// Order expiry has elapsed
    #[error("Order expired at {expiry}, current time {now}")]
    OrderExpired {
        /// Order expiry (unix seconds)
        expiry: u64,
        /// Time of the check (unix seconds)
        now: u64,
    },

    /// Order legs do not match the pool's custody or assets
    #[error("Order mismatch on {field}: expected {expected}, got {got}")]
    OrderMismatch {
        /// Mismatching field
        field: String,
        /// Value the pool requires
        expected: String,
        /// Value carried by the order
        got: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Order validator lacks the validator approval attribute
    #[error("Unauthorized validator: {0}")]
    UnauthorizedValidator(String),

    /// Beneficiary lacks the beneficiary approval attribute
    #[error("Unauthorized beneficiary: {0}")]
    UnauthorizedBeneficiary(String),

    // ═══════════════════════════════════════════════════════════════════
    // Queue Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Trade id is already pending
    #[error("Duplicate order: {0}")]
    DuplicateOrder(String),

    /// Trade id is not pending
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    // ═══════════════════════════════════════════════════════════════════
    // Liquidation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Pool does not hold enough staked collateral
    #[error("Insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral {
        /// Required stake amount
        required: u128,
        /// Stake currently held by the pool
        available: u128,
    },

    /// No pending order can cover the requested reclaim
    #[error("No pending order covers {amount}")]
    NoMatchingOrder {
        /// Requested reward amount
        amount: u128,
    },

    /// The settlement engine reverted the swap
    #[error("Settlement failed: {0}")]
    SettlementFailed(String),

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic / Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Addition or subtraction would wrap
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Token Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Holder balance too low for a transfer
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount to move
        required: u128,
        /// Holder balance
        available: u128,
    },

    /// Spender allowance too low for a delegated transfer
    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance {
        /// Amount to move
        required: u128,
        /// Approved amount
        approved: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Cryptographic operation failed
    #[error("Crypto error in {operation}: {details}")]
    CryptoError {
        /// Operation that failed
        operation: String,
        /// Error details
        details: String,
    },

    /// Invariant violation detected
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if the same call may succeed later without changing the order
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::SettlementFailed(_)
                | Error::InsufficientCollateral { .. }
                | Error::NoMatchingOrder { .. }
                | Error::UnauthorizedBeneficiary(_)
                | Error::InsufficientBalance { .. }
                | Error::InsufficientAllowance { .. }
        )
    }

    /// Returns true if the order involved can never succeed
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Error::MalformedOrder(_)
                | Error::InvalidSignature(_)
                | Error::SignerMismatch { .. }
                | Error::OrderExpired { .. }
                | Error::OrderMismatch { .. }
                | Error::DuplicateOrder(_)
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::InvariantViolation(_) | Error::ArithmeticOverflow { .. }
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Order errors: 1xxx
            Error::MalformedOrder(_) => 1001,
            Error::InvalidSignature(_) => 1002,
            Error::SignerMismatch { .. } => 1003,
            Error::OrderExpired { .. } => 1004,
            Error::OrderMismatch { .. } => 1005,

            // Authorization errors: 2xxx
            Error::UnauthorizedValidator(_) => 2001,
            Error::UnauthorizedBeneficiary(_) => 2002,

            // Queue errors: 3xxx
            Error::DuplicateOrder(_) => 3001,
            Error::OrderNotFound(_) => 3002,

            // Liquidation errors: 4xxx
            Error::InsufficientCollateral { .. } => 4001,
            Error::NoMatchingOrder { .. } => 4002,
            Error::SettlementFailed(_) => 4003,

            // Arithmetic / validation errors: 5xxx
            Error::ArithmeticOverflow { .. } => 5001,
            Error::ZeroAmount => 5002,
            Error::InvalidParameter { .. } => 5003,

            // Token errors: 6xxx
            Error::InsufficientBalance { .. } => 6001,
            Error::InsufficientAllowance { .. } => 6002,

            // Internal errors: 9xxx
            Error::CryptoError { .. } => 9001,
            Error::InvariantViolation(_) => 9002,
            Error::Serialization(_) => 9003,
            Error::Deserialization(_) => 9004,
        }
    }
}
