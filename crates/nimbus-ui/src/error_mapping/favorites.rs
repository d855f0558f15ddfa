use nimbus_core::{AppError, StorageError};
use nimbus_weather::StoreError;

pub fn from_store(err: StoreError) -> AppError {
    match err {
        StoreError::Read { path, message } => {
            AppError::Storage(StorageError::ReadFailed(format!("{}: {}", path, message)))
        }
        StoreError::Write { path, message } => {
            AppError::Storage(StorageError::WriteFailed(format!("{}: {}", path, message)))
        }
        StoreError::Corrupt { key, message } => {
            AppError::Storage(StorageError::Corrupt(format!("{}: {}", key, message)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_storage() {
        let err = from_store(StoreError::Corrupt {
            key: "favorites".into(),
            message: "expected array".into(),
        });
        assert_eq!(err.user_message(), "Saved favorites are unreadable.");

        let err = from_store(StoreError::Write {
            path: "/ro/storage.json".into(),
            message: "permission denied".into(),
        });
        assert!(err.to_string().contains("/ro/storage.json"));
    }
}
