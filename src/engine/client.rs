use crate::config::EngineConfig;
use crate::engine::schema::{
    EngineErrorBody, IndexSchema, PartialUpdate, DOCUMENT_MISSING_ERROR, INDEX_EXISTS_ERROR,
};
use crate::error::{EngineError, EngineResult};
use crate::observability::{sanitize_url_for_logging, LoggingService};
use crate::types::{Employee, SearchHits};
use reqwest::{Client, RequestBuilder};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// REST client for the employee index of the search engine
#[derive(Debug, Clone)]
pub struct EngineClient {
    /// Shared HTTP client carrying the outbound deadlines
    http_client: Client,
    /// Engine base URL, without trailing slash
    base_url: String,
    /// Index holding employee documents
    index: String,
    logger: LoggingService,
}

/// Status and fully drained body of one engine round trip
#[derive(Debug)]
struct EngineResponse {
    status: u16,
    body: String,
}

impl EngineResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn error_body(&self) -> EngineErrorBody {
        EngineErrorBody::parse(&self.body)
    }

    /// Map a non-success reply to an engine failure
    fn into_result(self) -> EngineResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let reason = self
            .error_body()
            .reason()
            .unwrap_or_else(|| format!("engine responded with status {}", self.status));
        Err(EngineError::Engine {
            status: self.status,
            reason,
        })
    }
}

impl EngineClient {
    /// Create a new engine client from configuration
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| EngineError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(
            "Engine client targeting {} (index '{}')",
            sanitize_url_for_logging(&base_url),
            config.index
        );

        Ok(Self {
            http_client,
            base_url,
            index: config.index,
            logger: LoggingService::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Probe the engine root
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> EngineResult<()> {
        let request = self.http_client.get(format!("{}/", self.base_url));
        self.execute("check_health", request).await?.into_result()?;
        Ok(())
    }

    /// Declare the employee index. An index that already exists counts as success.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn create_index(&self) -> EngineResult<()> {
        let request = self
            .http_client
            .put(self.index_url(""))
            .json(&IndexSchema::mapping());
        let response = self.execute("create_index", request).await?;

        if !response.is_success() && response.error_body().error_type() == Some(INDEX_EXISTS_ERROR) {
            info!("Index '{}' already exists", self.index);
            return Ok(());
        }

        response.into_result()?;
        info!("Index '{}' created", self.index);
        Ok(())
    }

    /// Store the employee under its identifier, replacing any existing document
    #[instrument(skip(self, employee), fields(id = employee.id))]
    pub async fn insert_data(&self, employee: &Employee) -> EngineResult<()> {
        let request = self
            .http_client
            .put(self.index_url(&format!("/_doc/{}", employee.id)))
            .json(employee);
        self.execute("insert_data", request).await?.into_result()?;
        Ok(())
    }

    /// Merge the employee's non-empty fields into the stored document
    #[instrument(skip(self, employee), fields(id = employee.id))]
    pub async fn update_data(&self, employee: &Employee) -> EngineResult<()> {
        let request = self
            .http_client
            .post(self.index_url(&format!("/_update/{}", employee.id)))
            .json(&PartialUpdate { doc: employee });
        let response = self.execute("update_data", request).await?;

        if response.status == 404 && response.error_body().error_type() == Some(DOCUMENT_MISSING_ERROR) {
            return Err(EngineError::NotFound(employee.id));
        }

        response.into_result()?;
        Ok(())
    }

    /// Remove the document stored under `id`
    #[instrument(skip(self))]
    pub async fn delete_data(&self, id: i64) -> EngineResult<()> {
        let request = self
            .http_client
            .delete(self.index_url(&format!("/_doc/{}", id)));
        let response = self.execute("delete_data", request).await?;

        // A missing document comes back as 404 without an error object;
        // a missing index carries one and stays an engine failure.
        if response.status == 404 && response.error_body().error.is_none() {
            return Err(EngineError::NotFound(id));
        }

        response.into_result()?;
        Ok(())
    }

    /// Match `keyword` against employee names
    #[instrument(skip(self))]
    pub async fn search_data(&self, keyword: &str) -> EngineResult<Vec<Employee>> {
        let request = self
            .http_client
            .get(self.index_url("/_search"))
            .json(&IndexSchema::match_name_query(keyword));
        let response = self.execute("search_data", request).await?.into_result()?;

        let hits: SearchHits = serde_json::from_str(&response.body)?;
        let employees = hits.into_employees();
        info!("Search for '{}' returned {} employees", keyword, employees.len());
        Ok(employees)
    }

    /// Insert synthetic employees for ids in `[id_start, id_end)`, stopping at the first failure
    #[instrument(skip(self))]
    pub async fn seeding_data(&self, id_start: i64, id_end: i64) -> EngineResult<usize> {
        let mut inserted = 0;
        for id in id_start..id_end {
            if let Err(e) = self.insert_data(&Employee::synthetic(id)).await {
                warn!("Seeding stopped at id {}: {}", id, e);
                return Err(EngineError::Seeding {
                    id,
                    source: Box::new(e),
                });
            }
            inserted += 1;
        }
        info!("Seeded {} employees", inserted);
        Ok(inserted)
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index, suffix)
    }

    /// Send one request and drain its body, whatever the status
    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> EngineResult<EngineResponse> {
        let call_id = Uuid::new_v4();
        let request = request.build()?;
        let method = request.method().to_string();
        let path = request.url().path().to_string();
        let start = Instant::now();

        let result = async {
            let response = self.http_client.execute(request).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, EngineError>(EngineResponse { status, body })
        }
        .await;

        match result {
            Ok(response) => {
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.logger.log_engine_call(
                    call_id,
                    operation,
                    &method,
                    &path,
                    response.status,
                    duration_ms,
                    &response.body,
                );
                Ok(response)
            }
            Err(e) => {
                let context = std::collections::HashMap::from([
                    ("operation".to_string(), serde_json::json!(operation)),
                    ("method".to_string(), serde_json::json!(method)),
                    ("path".to_string(), serde_json::json!(path)),
                ]);
                self.logger.log_error(call_id, &e, Some(context));
                Err(e)
            }
        }
    }
}
