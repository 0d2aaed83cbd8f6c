//! Contract interfaces of Xcert asset ledgers.

use alloy_sol_types::sol;

sol! {
	interface IXcert {
		function name() external view returns (string);
		function symbol() external view returns (string);
		function uriPrefix() external view returns (string);
		function uriPostfix() external view returns (string);
		function schemaId() external view returns (bytes32);
		function totalSupply() external view returns (uint256);
		function tokenURI(uint256 _tokenId) external view returns (string);
		function tokenImprint(uint256 _tokenId) external view returns (bytes32);
		function balanceOf(address _owner) external view returns (uint256);
		function ownerOf(uint256 _tokenId) external view returns (address);
		function getApproved(uint256 _tokenId) external view returns (address);
		function tokenOfOwnerByIndex(address _owner, uint256 _index) external view returns (uint256);
		function isAble(address _target, uint8 _ability) external view returns (bool);
		function isPaused() external view returns (bool);

		function create(address _to, uint256 _id, bytes32 _imprint) external;
		function safeTransferFrom(address _from, address _to, uint256 _tokenId, bytes _data) external;
		function transferFrom(address _from, address _to, uint256 _tokenId) external;
		function destroy(uint256 _tokenId) external;
		function revoke(uint256 _tokenId) external;
		function updateTokenImprint(uint256 _tokenId, bytes32 _imprint) external;
		function approve(address _approved, uint256 _tokenId) external;
		function assignAbilities(address _target, uint8[] _abilities) external;
		function revokeAbilities(address _target, uint8[] _abilities) external;
		function setPause(bool _isPaused) external;
	}
}
