//! 端到端集成测试：用本地 mock 判题服务器驱动完整会话循环

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use llm_quiz_solver::config::Config;
use llm_quiz_solver::models::{Classification, SolveRequest};
use llm_quiz_solver::orchestrator::run_session;

/// 测试配置：关闭渲染和 LLM 兜底，只走本地策略
fn test_config() -> Config {
    Config {
        render_enabled: false,
        llm_api_key: String::new(),
        download_dir: std::env::temp_dir()
            .join("llmquiz_it")
            .to_string_lossy()
            .to_string(),
        ..Default::default()
    }
}

fn request_for(url: String) -> SolveRequest {
    SolveRequest {
        url,
        email: "student@example.com".to_string(),
        secret: "Mysecret".to_string(),
    }
}

/// 构造带嵌入式答案和提交表单的挑战页面
fn challenge_page(question: &str, submit_path: &str, answer: i64) -> String {
    let payload = STANDARD.encode(json!({ "answer": answer }).to_string());
    format!(
        r#"<html><body>
            <div id="result">{}</div>
            <form method="post" action="{}"></form>
            <script>eval(atob(`{}`))</script>
        </body></html>"#,
        question, submit_path, payload
    )
}

/// 单题链：嵌入式答案命中，判题返回 correct
#[tokio::test]
async fn test_single_challenge_solved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(challenge_page("Decode the payload", "/grade", 7)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"correct": true}"#))
        .mount(&server)
        .await;

    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&test_config(), 1, &request_for(start_url))
        .await
        .unwrap();

    assert_eq!(result.results.len(), 1);
    let record = &result.results[0];
    assert_eq!(record.answer, json!(7));
    assert_eq!(record.handler, "embedded_answer");
    assert_eq!(record.confidence, 0.99);
    assert_eq!(record.outcome.classification, Classification::Correct);
}

/// 两题链：第一题判题响应带下一题地址（即使 correct 为 true 也要
/// 开新窗口），第二题以非 JSON 文本终局
#[tokio::test]
async fn test_chain_follows_next_url_until_terminal() {
    let server = MockServer::start().await;

    let quiz2_url = format!("{}/quiz/2", server.uri());

    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(challenge_page("first", "/grade/1", 1)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({ "correct": true, "url": quiz2_url.clone() }).to_string(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quiz/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(challenge_page("second", "/grade/2", 2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Quiz complete!"))
        .mount(&server)
        .await;

    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&test_config(), 2, &request_for(start_url))
        .await
        .unwrap();

    assert_eq!(result.results.len(), 2);
    assert!(matches!(
        result.results[0].outcome.classification,
        Classification::ChainContinues(ref next) if next == &quiz2_url
    ));
    assert_eq!(
        result.results[1].outcome.classification,
        Classification::TerminalNonJson
    );
}

/// 自循环保护：判题返回与刚提交相同的 URL 时不得开新窗口
#[tokio::test]
async fn test_loop_guard_stops_chain() {
    let server = MockServer::start().await;

    let quiz_url = format!("{}/quiz/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(challenge_page("looping", "/grade", 3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(json!({ "url": quiz_url.clone() }).to_string()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = run_session(&test_config(), 3, &request_for(quiz_url))
        .await
        .unwrap();

    // 只提交一次，自循环地址按终局处理
    assert_eq!(result.results.len(), 1);
    assert_eq!(
        result.results[0].outcome.classification,
        Classification::TerminalNonJson
    );
}

/// 答错不重试：correct 为 false 且无后续地址时窗口一次性放弃
#[tokio::test]
async fn test_incorrect_answer_is_one_shot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(challenge_page("hard one", "/grade", 4)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"correct": false}"#))
        .expect(1)
        .mount(&server)
        .await;

    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&test_config(), 4, &request_for(start_url))
        .await
        .unwrap();

    assert_eq!(result.results.len(), 1);
    assert_eq!(
        result.results[0].outcome.classification,
        Classification::IncorrectContinue
    );
}

/// 会话预算耗尽：不再发起任何网络调用，返回已累计的历史
#[tokio::test]
async fn test_session_budget_elapsed_means_no_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("should never be fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        session_budget_secs: 0,
        ..test_config()
    };
    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&config, 5, &request_for(start_url))
        .await
        .unwrap();

    assert!(result.results.is_empty());
}

/// 页面没有提交地址：窗口放弃，会话正常收尾
#[tokio::test]
async fn test_page_without_submit_url_is_abandoned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>nothing to submit</p>"))
        .mount(&server)
        .await;

    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&test_config(), 6, &request_for(start_url))
        .await
        .unwrap();

    assert!(result.results.is_empty());
}

/// 表格求和链路：页面表格 + 题目提示 → 0.92 置信度提交
#[tokio::test]
async fn test_table_sum_challenge() {
    let server = MockServer::start().await;

    let page = r#"<html><body>
            <div id="result">What is the sum of the value column?</div>
            <form action="/grade"></form>
            <table><tr><th>value</th></tr><tr><td>1,200</td></tr><tr><td>300</td></tr></table>
        </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/quiz/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/grade"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"correct": true}"#))
        .mount(&server)
        .await;

    let start_url = format!("{}/quiz/1", server.uri());
    let result = run_session(&test_config(), 7, &request_for(start_url))
        .await
        .unwrap();

    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].answer, json!(1500.0));
    assert_eq!(result.results[0].handler, "table_sum");
    assert_eq!(result.results[0].confidence, 0.92);
}
