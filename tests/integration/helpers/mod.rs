// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use harvestrs::config::settings::ScrapingConfig;
use harvestrs::domain::models::listing::{JobPosting, Product};
use harvestrs::domain::models::record::{Record, RecordSet};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// 模拟数据源返回的一页
#[derive(Clone)]
pub enum MockPage {
    Ok(&'static str),
    Status(u16),
}

#[derive(Clone, Default)]
struct SourceState {
    pages: Arc<HashMap<String, MockPage>>,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// 本地模拟数据源
///
/// `/busca` 按 `pagina` 参数返回预设页面，未预设的页码返回 404
pub struct MockSource {
    pub base_url: String,
    state: SourceState,
}

impl MockSource {
    pub async fn start(pages: Vec<(u32, MockPage)>) -> Self {
        let state = SourceState {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(page, body)| (page.to_string(), body))
                    .collect(),
            ),
            ..SourceState::default()
        };

        let app = Router::new()
            .route("/busca", get(search))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// 带 `{term}`、`{scope}`、`{page}` 占位符的URL模板
    pub fn template(&self) -> String {
        format!("{}/busca?q={{term}}&local={{scope}}&pagina={{page}}", self.base_url)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// 收到的查询参数（已解码）
    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().unwrap().clone()
    }
}

async fn search(
    State(state): State<SourceState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let page = params.get("pagina").cloned().unwrap_or_default();
    state.queries.lock().unwrap().push(params);

    match state.pages.get(&page) {
        Some(MockPage::Ok(body)) => Html(*body).into_response(),
        Some(MockPage::Status(code)) => StatusCode::from_u16(*code).unwrap().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// 不等待、不重试的抓取配置
pub fn fast_config(max_retries: u32) -> ScrapingConfig {
    ScrapingConfig {
        delay: 0.0,
        timeout: 5,
        max_retries,
        use_random_agent: true,
        retry_backoff: 0.0,
        max_backoff: 0.0,
        ..ScrapingConfig::default()
    }
}

/// 两条商品，第二条没有评分
pub fn sample_products() -> RecordSet {
    RecordSet::from(vec![
        Record::from(Product {
            name: Some("Notebook Ultra".into()),
            category: Some("eletrônicos".into()),
            price: Some(3499.9),
            rating: Some(4.5),
            reviews_count: Some(1234),
            availability: Some("Em estoque".into()),
            brand: Some("TechBrand".into()),
            url: Some("https://loja.example.com/p/notebook-ultra".into()),
        }),
        Record::from(Product {
            name: Some("Sofá Retrátil".into()),
            category: Some("casa".into()),
            price: Some(2100.0),
            rating: None,
            reviews_count: Some(0),
            availability: Some("Últimas unidades".into()),
            brand: None,
            url: Some("https://loja.example.com/p/sofa".into()),
        }),
    ])
}

/// 两条职位，薪资与发布日期是形如数字的文本
pub fn sample_jobs() -> RecordSet {
    RecordSet::from(vec![
        Record::from(JobPosting {
            title: Some("Desenvolvedor Python Sênior".into()),
            company: Some("Tech Solutions".into()),
            location: Some("São Paulo, SP".into()),
            salary: Some("8000".into()),
            requirements: Some("Python, Django".into()),
            posted_date: Some("2024".into()),
            url: Some("https://vagas.example.com/vaga/101".into()),
        }),
        Record::from(JobPosting {
            title: Some("Analista de Dados".into()),
            salary: Some("4500.50".into()),
            ..JobPosting::default()
        }),
    ])
}

pub const JOBS_PAGE: &str = r#"<html><body>
  <div class="job-card">
    <h2 class="job-title"><a href="/vaga/101">Desenvolvedor Python Sênior</a></h2>
    <span class="company">Tech Solutions</span>
    <span class="location">São Paulo, SP</span>
    <span class="salary">R$ 8.000 - R$ 12.000</span>
    <p class="requirements">Python, Django, PostgreSQL</p>
    <time datetime="2024-03-15">15/03</time>
  </div>
  <div class="job-card">
    <h2 class="job-title"><a href="/vaga/102">Desenvolvedor Python Júnior</a></h2>
    <span class="company">Startup XYZ</span>
  </div>
</body></html>"#;

pub const MALFORMED_PAGE: &str = "<html><body><div class=\"erro\">Serviço indisponível";
