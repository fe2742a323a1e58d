use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use znob::cli::RunOptions;
use znob::error::{AppError, LlmError, RenderError};
use znob::infrastructure::workspace::write_new;
use znob::orchestrator::{summarize, PrepareProcessor, QueryProcessor};
use znob::sources::HttpFetcher;
use znob::{
    model_slug, App, AppResult, Config, FsResponseStore, ModelClient, PresentationMode, QuestionFlow,
    Rasterizer, ResponseStore, Workspace,
};

const MODEL: &str = "test/model:free";

// ========== 测试替身 ==========

/// 记录调用次数；提示词含 FAIL 时返回错误；题号越小回答越慢
#[derive(Default)]
struct FakeModel {
    calls: AtomicUsize,
}

impl FakeModel {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn query(&self, prompt: &str, _image: Option<&[u8]>, model: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if prompt.starts_with("Підсумуй") {
            return Ok("1) А\n2) Б".to_string());
        }
        if prompt.contains("FAIL") {
            return Err(LlmError::EmptyContent {
                model: model.to_string(),
            }
            .into());
        }

        let index: u64 = prompt
            .lines()
            .next()
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(60u64.saturating_sub(index * 15))).await;

        Ok(format!("Відповідь на завдання {}", index))
    }
}

/// 生成固定大小的白底 PNG，左上角有一块黑色内容；页面含 `fail_on` 时截图失败
struct FakeRasterizer {
    calls: AtomicUsize,
    fail_on: Option<&'static str>,
}

impl FakeRasterizer {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: None,
        }
    }

    fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Self::new()
        }
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(&self, html: &str) -> AppResult<Vec<u8>> {
        assert!(html.contains("width:512px"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.is_some_and(|marker| html.contains(marker)) {
            return Err(RenderError::Browser {
                source: "截图超时".into(),
            }
            .into());
        }

        let mut img = RgbaImage::from_pixel(512, 400, Rgba([255, 255, 255, 255]));
        for x in 20..120 {
            for y in 20..60 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

// ========== 辅助函数 ==========

async fn workspace_in(dir: &Path) -> Workspace {
    let ws = Workspace::new(dir);
    ws.ensure_dirs().await.unwrap();
    ws
}

async fn write_question(ws: &Workspace, index: usize, body: &str, with_image: bool) {
    let markdown = format!("## Завдання {}\n\n{}\n", index, body);
    write_new(&ws.question_markdown(index), markdown.as_bytes())
        .await
        .unwrap();
    if with_image {
        write_new(&ws.question_image(index), b"png").await.unwrap();
    }
}

fn query_processor(ws: &Workspace, model: Arc<FakeModel>) -> QueryProcessor {
    let store: Arc<dyn ResponseStore> = Arc::new(FsResponseStore::new(ws.clone()));
    let flow = QuestionFlow::new(
        model,
        Arc::clone(&store),
        ws.clone(),
        PresentationMode::TextAndImage,
        false,
    )
    .unwrap();
    QueryProcessor::new(Arc::new(flow), store, ws.clone(), 4)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

const HTML_SOURCE: &str = r#"<html><body>
<div class="task-card" id="q1">
  <div class="counter">Завдання 1</div>
  <div class="question"><p>Скільки буде 2+2?</p></div>
  <div class="answers">
    <div class="quest-title"><i>Варіанти</i></div>
    <div class="answer"><span class="marker">А</span>3</div>
    <div class="answer"><span class="marker">Б</span>4</div>
  </div>
  <div class="description">Вид завдання: <a href="https://zno.osvita.ua/help">одна відповідь</a></div>
  <table class="select-answers-variants">
    <tr><th></th><th>А</th><th>Б</th></tr>
    <tr><td><span class="marker"></span></td><td><span class="marker ok"></span></td></tr>
  </table>
</div>
<div class="task-card" id="q2">
  <div class="counter">Завдання 2</div>
  <div class="question">Встановіть відповідність</div>
  <table class="select-answers-variants">
    <tr><th></th><th>А</th><th>Б</th></tr>
    <tr><th class="r">1</th><td></td><td><span class="marker ok"></span></td></tr>
    <tr><th class="r">2</th><td><span class="marker ok"></span></td><td></td></tr>
  </table>
</div>
</body></html>"#;

const JSON_SOURCE: &str = r#"[{
  "id": "q1",
  "counter": "Завдання 1",
  "question": ["Скільки буде 2+2?"],
  "answerGroups": [{
    "quest-title": "Варіанти",
    "answers": [{"marker": "А", "answer": "3"}, {"marker": "Б", "answer": "4"}]
  }],
  "help": "https://zno.osvita.ua/help",
  "type_text": "одна відповідь",
  "correct": "Б"
}]"#;

const EXPECTED_MARKDOWN: &str = "## Завдання 1\n\n\
Скільки буде 2+2?\n\n\
*Варіанти*\n\n\
**А** 3\n\n\
**Б** 4\n\n\
Вид завдання: [одна відповідь](https://zno.osvita.ua/help)\n";

async fn prepare(ws: &Workspace, rasterizer: &FakeRasterizer, source: &Path) -> znob::orchestrator::PrepareStats {
    PrepareProcessor::new(ws, rasterizer, &Config::default())
        .run(source.to_str().unwrap(), &HttpFetcher::new())
        .await
        .unwrap()
}

// ========== 准备阶段 ==========

#[tokio::test]
async fn test_prepare_html_writes_pairs_and_answer_key() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.html");
    std::fs::write(&source, HTML_SOURCE).unwrap();
    let ws = workspace_in(&dir.path().join("dataset")).await;
    let rasterizer = FakeRasterizer::new();

    let stats = prepare(&ws, &rasterizer, &source).await;

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 2);
    assert_eq!(ws.contiguous_question_count().await, 2);
    assert_eq!(read(&ws.question_markdown(1)), EXPECTED_MARKDOWN);
    assert_eq!(read(&ws.answers()), "1) Б\n2) 1-Б, 2-А");

    // 裁剪到内容 + 8 像素边距
    let png = image::open(ws.question_image(1)).unwrap();
    assert_eq!((png.width(), png.height()), (128, 68));
}

#[tokio::test]
async fn test_second_prepare_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.html");
    std::fs::write(&source, HTML_SOURCE).unwrap();
    let ws = workspace_in(&dir.path().join("dataset")).await;
    let rasterizer = FakeRasterizer::new();

    prepare(&ws, &rasterizer, &source).await;
    std::fs::write(ws.question_markdown(1), "edited").unwrap();
    std::fs::write(ws.answers(), "edited key").unwrap();

    let stats = prepare(&ws, &rasterizer, &source).await;

    assert_eq!(stats.skipped, 2);
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(read(&ws.question_markdown(1)), "edited");
    assert_eq!(read(&ws.answers()), "edited key");
}

#[tokio::test]
async fn test_html_and_json_sources_agree() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("page.html");
    let json = dir.path().join("export.json");
    std::fs::write(&html, HTML_SOURCE).unwrap();
    std::fs::write(&json, JSON_SOURCE).unwrap();

    let from_html = workspace_in(&dir.path().join("html")).await;
    let from_json = workspace_in(&dir.path().join("json")).await;
    let rasterizer = FakeRasterizer::new();
    prepare(&from_html, &rasterizer, &html).await;
    prepare(&from_json, &rasterizer, &json).await;

    assert_eq!(
        read(&from_html.question_markdown(1)),
        read(&from_json.question_markdown(1))
    );
    assert_eq!(read(&from_json.answers()), "1) Б");
}

#[tokio::test]
async fn test_render_failure_isolated_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.html");
    std::fs::write(
        &source,
        r#"<div class="task-card"><div class="question">перше</div></div>
           <div class="task-card"><div class="question">BROKEN</div></div>
           <div class="task-card"><div class="question">третє</div></div>"#,
    )
    .unwrap();
    let ws = workspace_in(&dir.path().join("dataset")).await;
    let rasterizer = FakeRasterizer::failing_on("BROKEN");

    let stats = prepare(&ws, &rasterizer, &source).await;

    assert_eq!((stats.total, stats.success, stats.failed), (3, 2, 1));
    assert!(ws.question_pair_exists(1).await);
    assert!(ws.question_pair_exists(3).await);
    assert!(!ws.question_markdown(2).exists());
    assert!(!ws.question_image(2).exists());
    assert_eq!(ws.contiguous_question_count().await, 1);

    match stats.ensure_complete().unwrap_err() {
        AppError::Render(RenderError::Incomplete { failed, total }) => {
            assert_eq!((failed, total), (1, 3));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_markdown_write_failure_leaves_no_image() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("page.html");
    std::fs::write(&source, HTML_SOURCE).unwrap();
    let ws = workspace_in(&dir.path().join("dataset")).await;
    // 同名目录占住 markdown 路径，写入必然失败
    std::fs::create_dir(ws.question_markdown(1)).unwrap();

    let stats = prepare(&ws, &FakeRasterizer::new(), &source).await;

    assert_eq!((stats.success, stats.failed), (1, 1));
    assert!(!ws.question_image(1).exists());
    assert!(ws.question_pair_exists(2).await);
}

// ========== 查询阶段 ==========

#[tokio::test]
async fn test_second_run_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    for i in 1..=3 {
        write_question(&ws, i, "текст", true).await;
    }
    let model = Arc::new(FakeModel::default());
    let processor = query_processor(&ws, Arc::clone(&model));

    let first = processor.run(MODEL).await.unwrap();
    assert_eq!(model.calls(), 3);

    let slug = model_slug(MODEL);
    let before = read(&ws.response(2, &slug));
    let second = processor.run(MODEL).await.unwrap();

    assert_eq!(model.calls(), 3);
    assert_eq!(first, second);
    assert_eq!(read(&ws.response(2, &slug)), before);
}

#[tokio::test]
async fn test_missing_image_ends_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    write_question(&ws, 1, "a", true).await;
    write_question(&ws, 2, "b", true).await;
    write_question(&ws, 3, "c", false).await;
    write_question(&ws, 4, "d", true).await;
    let model = Arc::new(FakeModel::default());

    let responses = query_processor(&ws, Arc::clone(&model)).run(MODEL).await.unwrap();

    assert_eq!(responses.len(), 2);
    assert_eq!(model.calls(), 2);
    assert!(!ws.response(4, &model_slug(MODEL)).exists());
}

#[tokio::test]
async fn test_failure_keeps_siblings_and_rerun_only_retries_failed() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    write_question(&ws, 1, "a", true).await;
    write_question(&ws, 2, "FAIL", true).await;
    write_question(&ws, 3, "c", true).await;
    let model = Arc::new(FakeModel::default());
    let processor = query_processor(&ws, Arc::clone(&model));
    let slug = model_slug(MODEL);

    let err = processor.run(MODEL).await.unwrap_err();
    match err {
        AppError::Llm(LlmError::BatchFailed { failed, total, .. }) => {
            assert_eq!((failed, total), (1, 3));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(ws.response(1, &slug).exists());
    assert!(!ws.response(2, &slug).exists());
    assert!(ws.response(3, &slug).exists());

    std::fs::write(ws.question_markdown(2), "## Завдання 2\n\nb\n").unwrap();
    let calls_before = model.calls();
    let responses = processor.run(MODEL).await.unwrap();

    assert_eq!(model.calls() - calls_before, 1);
    assert_eq!(responses[1], "Відповідь на завдання 2");
}

#[tokio::test]
async fn test_transcript_in_index_order() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    write_question(&ws, 1, "a", true).await;
    write_question(&ws, 2, "b", true).await;
    let model = Arc::new(FakeModel::default());

    // 第 1 题比第 2 题更晚完成
    let responses = query_processor(&ws, Arc::clone(&model)).run(MODEL).await.unwrap();
    let summary = summarize(model.as_ref(), &ws, MODEL, &responses).await.unwrap();

    let slug = model_slug(MODEL);
    assert_eq!(
        read(&ws.combined_responses(&slug)),
        "## Завдання 1\n\nВідповідь на завдання 1\n\n## Завдання 2\n\nВідповідь на завдання 2\n\n"
    );
    assert_eq!(summary.as_deref(), Some("1) А\n2) Б"));
    assert_eq!(read(&ws.summary(&slug)), "1) А\n2) Б");
}

#[tokio::test]
async fn test_no_questions_skips_summary() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    let model = Arc::new(FakeModel::default());

    let responses = query_processor(&ws, Arc::clone(&model)).run(MODEL).await.unwrap();
    let summary = summarize(model.as_ref(), &ws, MODEL, &responses).await;

    assert_eq!(tokio_test::assert_ok!(summary), None);
    assert_eq!(model.calls(), 0);
    assert!(!ws.summary(&model_slug(MODEL)).exists());
}

// ========== 应用 ==========

#[tokio::test]
async fn test_app_reset_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_in(dir.path()).await;
    write_question(&ws, 1, "a", true).await;
    let slug = model_slug(MODEL);
    write_new(&ws.response(1, &slug), b"stale").await.unwrap();

    let model = Arc::new(FakeModel::default());
    let options = RunOptions {
        dataset: dir.path().to_path_buf(),
        source: None,
        model: Some(MODEL.to_string()),
        reset: vec![znob::ArtifactKind::Responses],
        mode: PresentationMode::TextOnly,
    };
    let app = App::with_model_client(Config::default(), options, Some(model.clone()));

    app.run().await.unwrap();

    assert_eq!(model.calls(), 2);
    assert_eq!(read(&ws.response(1, &slug)), "Відповідь на завдання 1");
    assert!(ws.summary(&slug).exists());
}

#[test]
fn test_app_requires_api_key_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let options = RunOptions {
        dataset: dir.path().join("never-created"),
        source: None,
        model: Some(MODEL.to_string()),
        reset: Vec::new(),
        mode: PresentationMode::default(),
    };
    let config = Config {
        llm_api_key: None,
        ..Config::default()
    };

    let result = tokio_test::block_on(async { App::initialize(config, options).map(|_| ()) });

    assert!(result.unwrap_err().is_config());
    assert!(!dir.path().join("never-created").exists());
}
