//! Aludel reward program contract bindings.
//!
//! The Aludel holds reward schedules for a staking token and pays rewards when
//! stake is withdrawn. `unstakeAndClaim` is the only state-changing method the
//! pipeline calls; `getAludelData` is used to discover the staking token.

use alloy_sol_types::sol;

sol! {
    /// Aludel reward program interface
    #[sol(rpc)]
    interface IAludel {
        /// Linear reward multiplier applied over stake duration
        struct RewardScaling {
            uint256 floor;
            uint256 ceiling;
            uint256 time;
        }

        /// A single reward funding period
        struct RewardSchedule {
            uint256 duration;
            uint256 start;
            uint256 shares;
        }

        /// Global program state
        struct AludelData {
            address stakingToken;
            address rewardToken;
            address rewardPool;
            RewardScaling rewardScaling;
            uint256 rewardSharesOutstanding;
            uint256 totalStake;
            uint256 totalStakeUnits;
            uint256 lastUpdate;
            RewardSchedule[] rewardSchedules;
        }

        /// Emitted when stake is withdrawn and rewards are claimed
        event Unstaked(address vault, uint256 amount);

        /// Get the global program state (staking token, reward token, schedules)
        function getAludelData() external view returns (AludelData memory aludel);

        /// Withdraw `amount` of staking token from `vault` to `recipient` and
        /// claim accrued rewards. `permission` is the vault owner's signed
        /// unlock authorization.
        function unstakeAndClaim(
            address vault,
            address recipient,
            uint256 amount,
            bytes calldata permission
        ) external;
    }
}
