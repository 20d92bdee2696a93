use crate::domain::model::{GeoInfo, LinePlacement, RenderProfile, RenderedReport, ReportLine};
use crate::domain::ports::{FaceLoader, GlyphFace};
use crate::utils::error::{CardError, LookupError, Result};
use chrono::{Datelike, Local, NaiveDate};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// 星期日到星期六
pub const WEEKDAYS: [&str; 7] = [
    "星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六",
];

pub const LABEL_DATE: &str = "today is: ";
pub const LABEL_ADDRESS: &str = "your address is: ";
pub const LABEL_IP: &str = "your IP is: ";
pub const LABEL_CARRIER: &str = "carrier info: ";
pub const LABEL_AS: &str = "AS info: ";

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// `YYYY年MM月DD日 星期X`
pub fn format_report_date(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!("{} {}", date.format("%Y年%m月%d日"), weekday)
}

/// 固定五行，順序不可變
pub fn build_report_lines(ip: &str, geo: &GeoInfo, address: &str, today: NaiveDate) -> Vec<ReportLine> {
    let confirmed_ip = if geo.queried_ip.is_empty() {
        ip
    } else {
        geo.queried_ip.as_str()
    };

    vec![
        ReportLine::new(LABEL_DATE, format_report_date(today)),
        ReportLine::new(LABEL_ADDRESS, address),
        ReportLine::new(LABEL_IP, confirmed_ip),
        ReportLine::new(LABEL_CARRIER, geo.org.as_str()),
        ReportLine::new(LABEL_AS, geo.as_info.as_str()),
    ]
}

/// 逐行畫 label（黑）與 value（強調色）。
///
/// value 的起點是 `left_margin + measure(label)`，由字型量測決定而不是寫死。
pub fn layout_lines(
    face: &dyn GlyphFace,
    canvas: &mut RgbaImage,
    lines: &[ReportLine],
    profile: &RenderProfile,
) -> Vec<LinePlacement> {
    let mut baseline = profile.first_baseline;
    let mut placements = Vec::with_capacity(lines.len());

    for line in lines {
        face.draw(canvas, &line.label, profile.left_margin, baseline, profile.text_color);
        let label_width = face.measure(&line.label);
        let value_x = profile.left_margin + label_width;
        face.draw(canvas, &line.value, value_x, baseline, profile.accent_color);

        placements.push(LinePlacement {
            label_x: profile.left_margin,
            label_width,
            value_x,
            baseline,
        });
        baseline += profile.line_pitch;
    }

    placements
}

pub struct ReportRenderer {
    profile: RenderProfile,
    loader: Arc<dyn FaceLoader>,
}

impl ReportRenderer {
    pub fn new(profile: RenderProfile, loader: Arc<dyn FaceLoader>) -> Self {
        Self { profile, loader }
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    pub fn render(&self, ip: &str, geo: &GeoInfo, address: &str) -> Result<RenderedReport> {
        self.render_on(ip, geo, address, Local::now().date_naive())
    }

    pub fn render_on(
        &self,
        ip: &str,
        geo: &GeoInfo,
        address: &str,
        today: NaiveDate,
    ) -> Result<RenderedReport> {
        // 失敗的 geo 結果除了 message 之外都不可信
        if !geo.is_success() {
            return Err(CardError::UpstreamGeo(LookupError::Provider {
                message: geo.message.clone(),
            }));
        }

        let face = self
            .loader
            .load(&self.profile.font_path, self.profile.font_size)?;

        let lines = build_report_lines(ip, geo, address, today);
        let mut canvas = RgbaImage::from_pixel(self.profile.width, self.profile.height, BACKGROUND);
        layout_lines(face.as_ref(), &mut canvas, &lines, &self.profile);

        encode_png(&canvas)
    }
}

fn encode_png(canvas: &RgbaImage) -> Result<RenderedReport> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    tracing::debug!("Encoded {}x{} PNG ({} bytes)", canvas.width(), canvas.height(), bytes.len());
    Ok(RenderedReport::new(bytes))
}
