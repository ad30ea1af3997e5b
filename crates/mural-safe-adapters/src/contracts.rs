//! ABI bindings for the Safe v1.3.0 contracts this application touches.

use alloy::sol;

sol! {
    contract GnosisSafe {
        function VERSION() external view returns (string version);
        function nonce() external view returns (uint256 nonce);
        function getOwners() external view returns (address[] owners);
        function getThreshold() external view returns (uint256 threshold);
        function approvedHashes(address owner, bytes32 hash) external view returns (uint256 approved);

        function setup(
            address[] owners,
            uint256 threshold,
            address to,
            bytes data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address paymentReceiver
        ) external;

        function addOwnerWithThreshold(address owner, uint256 threshold) external;
        function removeOwner(address prevOwner, address owner, uint256 threshold) external;

        function execTransaction(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes signatures
        ) external payable returns (bool success);
    }
}

sol! {
    contract GnosisSafeProxyFactory {
        function proxyCreationCode() external pure returns (bytes code);
        function createProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);
    }
}
