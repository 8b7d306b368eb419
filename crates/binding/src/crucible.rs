//! Crucible universal vault contract bindings.
//!
//! A crucible is an ERC-721 backed vault holding a user's staked tokens.
//! Delegates (e.g. an Aludel) move funds out of it only with an EIP-712
//! permission signed by the vault owner over the vault's current nonce.

use alloy_sol_types::sol;

sol! {
    /// Universal vault interface
    #[sol(rpc)]
    interface ICrucible {
        /// Emitted when a delegate unlocks previously locked tokens
        event Unlocked(address delegate, address token, uint256 amount);

        /// Owner of the vault NFT
        function owner() external view returns (address);

        /// Current permission nonce; incremented on every lock/unlock
        function getNonce() external view returns (uint256);

        /// Amount of `token` locked by delegates
        function getBalanceLocked(address token) external view returns (uint256);

        /// Amount of `token` delegated to `delegate`
        function getBalanceDelegated(address token, address delegate) external view returns (uint256);
    }
}
