use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use wordlens_provider::{
    MeaningsLookup, MeaningsProvider, ProviderError, ProviderMetadata, RetryingHttpClient,
};
use wordlens_types::MeaningsRecord;

/// Fields never persisted with a record
const DROPPED_FIELDS: [&str; 2] = ["phonetics", "phonetic"];

/// Free dictionary API with `/<word>` entries
#[derive(Clone)]
pub struct DictionaryApi {
    client: RetryingHttpClient,
}

impl DictionaryApi {
    pub fn new(client: RetryingHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MeaningsProvider for DictionaryApi {
    async fn lookup(&self, word: &str) -> Result<MeaningsLookup, ProviderError> {
        let path = utf8_percent_encode(word, NON_ALPHANUMERIC).to_string();
        let response = self.client.get(&path, &[]).await?;

        match response.status {
            200 => {
                let data: Value = response.json()?;
                parse_entries(word, data)
            }
            404 => Ok(MeaningsLookup::NotFound),
            status => Err(ProviderError::from_status(status)),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Free Dictionary API".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

/// The first entry becomes the record; an empty list means no entry
fn parse_entries(word: &str, data: Value) -> Result<MeaningsLookup, ProviderError> {
    let Value::Array(entries) = data else {
        return Err(ProviderError::Malformed("expected a list of entries".to_string()));
    };

    let Some(first) = entries.into_iter().next() else {
        return Ok(MeaningsLookup::NotFound);
    };

    let Value::Object(mut fields) = first else {
        return Err(ProviderError::Malformed("entry is not an object".to_string()));
    };

    for field in DROPPED_FIELDS {
        fields.remove(field);
    }
    fields.remove("word");

    let meanings = match fields.remove("meanings") {
        Some(Value::Array(meanings)) => meanings,
        _ => vec![],
    };

    Ok(MeaningsLookup::Found(MeaningsRecord {
        word: word.to_string(),
        meanings,
        metadata: fields,
    }))
}
