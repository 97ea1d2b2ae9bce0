//! Certificate contract ABI

alloy::sol! {
    #[allow(missing_docs)]
    interface IGraduateCertificate {
        function getAllTokenIds() external view returns (uint256[] memory tokenIds);

        function getGraduate(uint256 tokenId)
            external
            view
            returns (
                string memory name,
                string memory program,
                string memory grade,
                uint256 year,
                uint256 timestamp
            );

        function ownerOf(uint256 tokenId) external view returns (address owner);

        function tokenURI(uint256 tokenId) external view returns (string memory uri);
    }
}
