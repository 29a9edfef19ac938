use clap::Parser;
use company_store::bridge::CompletionBridge;
use company_store::company::dataset::{
    DatasetBounds, department_key, employee_from_index, employee_index,
};
use company_store::company::protocol::{
    ENDPOINT_DEPARTMENTS, ENDPOINT_LOAD_SAMPLE_DATASET, ENDPOINT_TEAM_RANK, ENDPOINT_TEAMS,
    ENDPOINT_TEAMS_RANGE, LoadSampleDatasetResponse,
};
use company_store::company::types::{Department, Employee, TeamScore};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;

/// Calls every company endpoint once and logs what comes back.
#[derive(Debug, Parser)]
#[command(name = "company_client")]
struct Args {
    #[arg(long, env = "COMPANY_URL", default_value = "http://localhost:8280")]
    base_url: String,

    /// Per-request limit. Unset waits indefinitely.
    #[arg(long, env = "COMPANY_CLIENT_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[arg(long, default_value = "1")]
    range_from: String,

    #[arg(long, default_value = "3")]
    range_to: String,

    /// Teams whose ranks are requested together.
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 3, 5])]
    rank_ids: Vec<i32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // The bridge blocks this thread while the runtime's workers drive each request.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let client = CompanyClient {
        http: reqwest::Client::new(),
        base_url: args.base_url.trim_end_matches('/').to_string(),
        runtime: runtime.handle().clone(),
        timeout: args.timeout_ms.map(Duration::from_millis),
    };

    if let Err(e) = perform_requests(&client, &args) {
        tracing::error!("Requests failed: {}", e);
        return Err(e);
    }
    Ok(())
}

fn perform_requests(client: &CompanyClient, args: &Args) -> anyhow::Result<()> {
    let bounds = DatasetBounds::default();
    let department = department_key(bounds.department_from);
    let employee = employee_from_index(employee_index(bounds.department_from, bounds.employee_from));

    client.load_sample_dataset()?;
    client.departments()?;
    client.department(&department)?;
    client.employee(&department, &employee)?;
    client.teams()?;
    client.teams_in_range(&args.range_from, &args.range_to)?;
    client.team_ranks(args.rank_ids.clone())?;
    Ok(())
}

struct CompanyClient {
    http: reqwest::Client,
    base_url: String,
    runtime: Handle,
    timeout: Option<Duration>,
}

impl CompanyClient {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn load_sample_dataset(&self) -> anyhow::Result<()> {
        let request = self.http.get(self.url(ENDPOINT_LOAD_SAMPLE_DATASET));
        self.drain(
            "load_sample_dataset",
            fetch_one::<LoadSampleDatasetResponse>(request),
        )?;
        Ok(())
    }

    fn departments(&self) -> anyhow::Result<()> {
        let request = self.http.get(self.url(ENDPOINT_DEPARTMENTS));
        self.drain("departments", fetch_many::<Department>(request))?;
        Ok(())
    }

    fn department(&self, key: &str) -> anyhow::Result<()> {
        let request = self
            .http
            .get(self.url(&format!("{}/{}", ENDPOINT_DEPARTMENTS, key)));
        self.drain("department", fetch_one::<Department>(request))?;
        Ok(())
    }

    fn employee(&self, department: &str, employee: &Employee) -> anyhow::Result<()> {
        let request = self
            .http
            .get(self.url(&format!("{}/{}/employees", ENDPOINT_DEPARTMENTS, department)))
            .query(&[
                ("firstName", employee.first_name.as_str()),
                ("lastName", employee.last_name.as_str()),
            ]);
        self.drain("employee", fetch_one::<Employee>(request))?;
        Ok(())
    }

    fn teams(&self) -> anyhow::Result<()> {
        let request = self.http.get(self.url(ENDPOINT_TEAMS));
        self.drain("teams", fetch_many::<TeamScore>(request))?;
        Ok(())
    }

    fn teams_in_range(&self, from: &str, to: &str) -> anyhow::Result<()> {
        let request = self
            .http
            .get(self.url(ENDPOINT_TEAMS_RANGE))
            .query(&[("rangeFrom", from), ("rangeTo", to)]);
        self.drain("teams_in_range", fetch_many::<TeamScore>(request))?;
        Ok(())
    }

    /// Requests every rank concurrently and reports them as one (id, rank) list.
    fn team_ranks(&self, ids: Vec<i32>) -> anyhow::Result<()> {
        let requests: Vec<_> = ids
            .iter()
            .map(|id| {
                let request = self
                    .http
                    .get(self.url(ENDPOINT_TEAM_RANK))
                    .query(&[("id", id.to_string())]);
                fetch_one::<u64>(request)
            })
            .collect();

        let zipped = async move {
            let ranks = futures::future::try_join_all(requests).await?;
            let pairs: Vec<(i32, Option<u64>)> = ids
                .into_iter()
                .zip(ranks.into_iter().map(|rank| rank.into_iter().next()))
                .collect();
            Ok::<_, reqwest::Error>(vec![pairs])
        };
        self.drain("team_ranks", zipped)?;
        Ok(())
    }

    /// Turns one response into a stream of its elements and blocks until the bridge
    /// reports the end of that stream.
    fn drain<T, Fut>(&self, label: &'static str, request: Fut) -> anyhow::Result<usize>
    where
        T: Debug + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, reqwest::Error>> + Send + 'static,
    {
        let elements = stream::once(request)
            .map_ok(|items| stream::iter(items).map(Ok::<T, reqwest::Error>))
            .try_flatten();

        let received = CompletionBridge::<reqwest::Error>::arm(label)
            .with_timeout(self.timeout)
            .subscribe_on(&self.runtime, elements, move |item| {
                tracing::info!("{}: {:?}", label, item);
            })
            .wait_blocking()
            .into_result()?;

        if received == 0 {
            tracing::info!("{}: completed empty", label);
        }
        Ok(received)
    }
}

/// A single JSON value; 404 is an empty result.
async fn fetch_one<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, reqwest::Error> {
    let response = request.send().await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    Ok(vec![response.error_for_status()?.json::<T>().await?])
}

/// A JSON array; 404 is an empty result.
async fn fetch_many<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, reqwest::Error> {
    let response = request.send().await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    response.error_for_status()?.json::<Vec<T>>().await
}
