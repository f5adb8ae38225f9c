use std::path::Path;

use publish_api::responses::PublishRecord;

use crate::{errors::Error, host::Host};

/// Metadata key holding the last server response.
pub const RECORD_KEY: &str = "webInfo";

/// The document's publish record, if it has a well formed one.
///
/// Missing or malformed records both mean "not yet published". Fields other than the
/// identifier may be absent, a record holding only `id` still targets that record.
pub async fn read_publish_record<H>(host: &H, path: &Path) -> Result<Option<PublishRecord>, Error>
where
    H: Host + ?Sized,
{
    let metadata = host.read_metadata(path).await?;

    let value = match metadata.get(RECORD_KEY) {
        Some(value) => value.clone(),
        None => return Ok(None),
    };

    match serde_json::from_value::<PublishRecord>(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed publish record");
            Ok(None)
        }
    }
}

/// Store `record` verbatim under [`RECORD_KEY`], leaving every other key in place.
pub async fn write_publish_record<H>(
    host: &H,
    path: &Path,
    record: &serde_json::Value,
) -> Result<(), Error>
where
    H: Host + ?Sized,
{
    let mut metadata = host.read_metadata(path).await?;

    metadata.insert(RECORD_KEY.to_owned(), record.clone());

    host.write_metadata(path, metadata).await
}
