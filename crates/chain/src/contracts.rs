//! Contract bindings.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface FlatDirectory {
        function write(bytes memory name, bytes calldata data) external payable;
        function writeChunk(bytes memory name, uint256 chunkId, bytes calldata data) external payable;
        function read(bytes memory name) external view returns (bytes memory, bool);
        function files(bytes memory name) external view returns (bytes memory);
        function readChunk(bytes memory name, uint256 chunkId) external view returns (bytes memory, bool);
        function countChunks(bytes memory name) external view returns (uint256);
        function getChunkHash(bytes memory name, uint256 chunkId) external view returns (bytes32);
        function remove(bytes memory name) external returns (uint256);
        function setDefault(bytes memory defaultFile) external;
        function refund() external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface FlatDirectoryFactory {
        event FlatDirectoryCreated(address addr);

        function create() external returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface PointerRegistry {
        function pointerOf(bytes memory name) external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface NameRegistry {
        function resolver(bytes32 node) external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface TextResolver {
        function text(bytes32 node, string calldata key) external view returns (string memory);
    }
}
