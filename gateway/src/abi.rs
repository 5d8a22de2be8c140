//! ABI surfaces of the two remote contracts.
//!
//! Generated call types are used on both sides of the boundary: clients
//! encode requests and decode returns, the test ledger decodes requests
//! and encodes returns.

use alloy_sol_types::sol;

sol! {
    /// Minimal ERC-20 surface the engine touches.
    interface IToken {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Constant-product pool surface.
    interface IPool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function reserve0() external view returns (uint256);
        function reserve1() external view returns (uint256);
        function getAmountOut(address tokenIn, uint256 amountIn) external view returns (uint256);
        function swapExactInput(address tokenIn, uint256 amountIn, uint256 minOut, address to) external returns (uint256);
    }
}
