//! Contract bindings for all external contracts.
//!
//! This crate consolidates all Solidity contract interfaces used across the project:
//! - Aludel reward programs (staking, unstake-and-claim)
//! - Crucible universal vaults (nonce, locked balances)
//! - ERC20 tokens
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod aludel;
pub mod crucible;
pub mod token;
