//! 页面截图 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"HTML → PNG"的能力

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tracing::debug;

use crate::error::{AppResult, RenderError};

/// 初始视口高度，整页截图时会按内容扩展
const VIEWPORT_HEIGHT: i64 = 800;

/// 等待页面中所有图片加载完成（失败的图片也算完成）
const WAIT_FOR_IMAGES_JS: &str = r#"
Promise.all(Array.from(document.images).map(img =>
    img.complete ? Promise.resolve() : new Promise(resolve => {
        img.addEventListener('load', resolve);
        img.addEventListener('error', resolve);
    })
)).then(() => document.images.length)
"#;

/// 把完整 HTML 页面渲染成 PNG
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str) -> AppResult<Vec<u8>>;
}

/// 基于 chromiumoxide 的渲染器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 固定视口宽度
/// - 不认识 Question
pub struct PageRenderer {
    page: Page,
    width: u32,
}

impl PageRenderer {
    pub fn new(page: Page, width: u32) -> Self {
        Self { page, width }
    }
}

#[async_trait]
impl Rasterizer for PageRenderer {
    async fn rasterize(&self, html: &str) -> AppResult<Vec<u8>> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(self.width),
                VIEWPORT_HEIGHT,
                1.0,
                false,
            ))
            .await?;
        self.page.set_content(html).await?;

        let images: i64 = self
            .page
            .evaluate(WAIT_FOR_IMAGES_JS.to_string())
            .await?
            .into_value()
            .map_err(|e| RenderError::Browser { source: e.into() })?;
        debug!("页面加载完成, 图片数: {}", images);

        let png = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .omit_background(false)
                    .build(),
            )
            .await?;
        debug!("截图完成: {} 字节", png.len());
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::launch_headless_browser;
    use crate::config::Config;

    #[tokio::test]
    #[ignore] // 需要本机安装 Chromium：cargo test -- --ignored
    async fn test_rasterize_fixed_width() {
        let config = Config::default();
        let (_browser, page) = launch_headless_browser(&config).await.expect("启动浏览器失败");
        let renderer = PageRenderer::new(page, config.render_width);

        let html = crate::render::document::styled_document("<p>Привіт</p>", config.render_width);
        let png = renderer.rasterize(&html).await.expect("截图失败");
        let image = image::load_from_memory(&png).expect("不是有效的 PNG");

        assert_eq!(image.width(), config.render_width);
    }
}
