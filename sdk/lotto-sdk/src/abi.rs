//! Call bindings for the deployed lottery contract.
//!
//! The interface is fixed by the deployment and never changes from this
//! crate's side. `getAllPoolsSimplifiedStatus` returns one flattened array:
//! rounds for every pool first, then ticket counts, then prizes.

use alloy::sol;

sol! {
    struct Winner {
        address winner;
        uint256 prize;
        uint256 poolId;
    }

    function ticketPrice() external view returns (uint256 price);

    function getSystemOverview()
        external
        view
        returns (uint256 totalTickets, uint256 totalPrize, uint256 activePools);

    function getAllPoolsSimplifiedStatus()
        external
        view
        returns (uint256[9] memory flat);

    function getUserCurrentTickets(address user)
        external
        view
        returns (uint256[3] memory counts);

    function getRecentWinners(uint256 limit)
        external
        view
        returns (Winner[] memory winners);

    function buyTicket(uint256 count) external payable;
}
