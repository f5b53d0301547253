//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use nxfw_errors::{Error, StorageError};
    use nxfw_hash::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_digest_matches_in_memory_digest() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("blob.nca");

        // larger than one chunk so streaming crosses a boundary
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&file_path, &data).unwrap();

        for algorithm in [HashAlgorithm::Md5, HashAlgorithm::Sha256] {
            let streamed = Hash::hash_file(algorithm, &file_path).unwrap();
            assert_eq!(streamed, Hash::from_data(algorithm, &data));
        }
    }

    #[test]
    fn test_missing_file_is_path_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.zip");

        let err = Hash::hash_file(HashAlgorithm::Md5, &missing).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::PathNotFound { ref path }) if path.ends_with("missing.zip")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_failure_keeps_its_kind() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("plain.nca");
        fs::write(&file_path, b"not a directory").unwrap();

        // a path through a regular file fails with ENOTDIR, not NotFound
        let nested = file_path.join("child.nca");
        let err = Hash::hash_file(HashAlgorithm::Md5, &nested).unwrap_err();
        match err {
            Error::Storage(StorageError::IoError { message }) => {
                assert!(message.contains("child.nca"), "{message}");
            }
            other => panic!("expected an I/O error naming the path, got {other:?}"),
        }
    }
}
