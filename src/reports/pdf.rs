//! PDF rendering for calorie reports
//!
//! Page 1 (portrait): summary and the daily table, continued on extra pages
//! for long ranges. Last page (landscape): intake vs burned trend chart.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use chrono::{Datelike, Weekday};
use printpdf::*;

use super::{DailyRecord, Progress, Report};

const COLOR_TITLE: (u8, u8, u8) = (0, 112, 192);
const COLOR_POSITIVE: (u8, u8, u8) = (0, 176, 80);
const COLOR_NEGATIVE: (u8, u8, u8) = (192, 0, 0);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

const LETTER_WIDTH: f32 = 215.9;
const LETTER_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 20.0;
const ROW_HEIGHT: f32 = 4.5;

const TABLE_HEADERS: [&str; 6] = ["Date", "Day", "Intake", "Burned", "Net", "Progress"];
const TABLE_COLUMNS: [f32; 6] = [28.0, 16.0, 26.0, 26.0, 26.0, 26.0];

fn day_of_week_abbrev(record: &DailyRecord) -> &'static str {
    match record.date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn progress_color(progress: Progress) -> (u8, u8, u8) {
    match progress {
        Progress::Positive => COLOR_POSITIVE,
        Progress::Negative => COLOR_NEGATIVE,
    }
}

// ============================================================================
// Chart (plotters)
// ============================================================================

/// Render the intake and burned series as a PNG line chart
pub fn render_trend_chart(daily: &[DailyRecord], width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if daily.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let peak = daily
            .iter()
            .map(|d| d.calorie_intake.max(d.calorie_burned))
            .max()
            .unwrap_or(0)
            .max(100) as f64;
        let x_max = (daily.len() as i32 - 1).max(1);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..x_max, 0.0..peak * 1.1)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(daily.len().min(10))
            .x_label_formatter(&|x| {
                daily
                    .get(*x as usize)
                    .filter(|_| *x >= 0)
                    .map(|d| d.date.format("%m/%d").to_string())
                    .unwrap_or_default()
            })
            .y_desc("kcal")
            .draw()
            .map_err(|e| e.to_string())?;

        let intake_color = RGBColor(COLOR_NEGATIVE.0, COLOR_NEGATIVE.1, COLOR_NEGATIVE.2);
        let burned_color = RGBColor(COLOR_POSITIVE.0, COLOR_POSITIVE.1, COLOR_POSITIVE.2);

        let intake_points: Vec<(i32, f64)> = daily
            .iter()
            .enumerate()
            .map(|(i, d)| (i as i32, d.calorie_intake as f64))
            .collect();
        let burned_points: Vec<(i32, f64)> = daily
            .iter()
            .enumerate()
            .map(|(i, d)| (i as i32, d.calorie_burned as f64))
            .collect();

        chart
            .draw_series(LineSeries::new(intake_points.clone(), intake_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Intake")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], intake_color.stroke_width(2)));

        chart
            .draw_series(LineSeries::new(burned_points.clone(), burned_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Burned")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], burned_color.stroke_width(2)));

        // Markers only when they stay readable
        if daily.len() <= 62 {
            chart
                .draw_series(intake_points.iter().map(|(x, y)| Circle::new((*x, *y), 3, intake_color.filled())))
                .map_err(|e| e.to_string())?;
            chart
                .draw_series(burned_points.iter().map(|(x, y)| Circle::new((*x, *y), 3, burned_color.filled())))
                .map_err(|e| e.to_string())?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    let img = ::image::RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    ::image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png_bytes), ::image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

// ============================================================================
// PDF helpers
// ============================================================================

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn add_rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_color(rgb_to_printpdf(COLOR_GRAY));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
            (Point::new(Mm(LETTER_WIDTH - MARGIN_LEFT), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn add_table_header(layer: &PdfLayerReference, font_bold: &IndirectFontRef, y: f32) {
    let mut col_x = MARGIN_LEFT;
    for (header, width) in TABLE_HEADERS.iter().zip(TABLE_COLUMNS) {
        add_text(layer, font_bold, header, col_x, y, 9.0, COLOR_BLACK);
        col_x += width;
    }
}

// ============================================================================
// Report PDF
// ============================================================================

/// Write `report` to `output_path`, creating parent directories as needed
pub fn write_report_pdf(report: &Report, output_path: &Path) -> Result<(), String> {
    let title = format!("Calorie Report - {}", report.report_type);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(LETTER_WIDTH), Mm(LETTER_HEIGHT), "Layer 1");

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = LETTER_HEIGHT - 20.0;

    add_text(&layer, &font_bold, &title, MARGIN_LEFT, y, 18.0, COLOR_TITLE);
    y -= 10.0;

    let start = report.date_range.start_date;
    let end = report.date_range.end_date;
    add_text(&layer, &font, &format!("Report Period: {} to {}", start, end), MARGIN_LEFT, y, 11.0, COLOR_BLACK);
    let now = chrono::Local::now().format("%Y-%m-%d").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), 120.0, y, 11.0, COLOR_BLACK);
    y -= 8.0;

    add_rule(&layer, y);
    y -= 8.0;

    // Summary
    let summary = &report.summary;
    add_text(&layer, &font_bold, "Summary", MARGIN_LEFT, y, 12.0, COLOR_BLACK);
    y -= 7.0;
    add_text(&layer, &font, &format!("Days Covered: {}", report.daily_data.len()), MARGIN_LEFT, y, 10.0, COLOR_BLACK);
    add_text(
        &layer,
        &font,
        &format!("Net Progress: {}", summary.net_progress.as_str()),
        80.0,
        y,
        10.0,
        progress_color(summary.net_progress),
    );
    y -= 6.0;
    add_text(&layer, &font, &format!("Average Intake: {} kcal/day", summary.avg_intake), MARGIN_LEFT, y, 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Average Burned: {} kcal/day", summary.avg_burned), 80.0, y, 10.0, COLOR_BLACK);
    y -= 6.0;
    let positive_days = report
        .daily_data
        .iter()
        .filter(|d| d.progress == Progress::Positive)
        .count();
    add_text(
        &layer,
        &font,
        &format!("Positive Days: {} of {}", positive_days, report.daily_data.len()),
        MARGIN_LEFT,
        y,
        10.0,
        COLOR_BLACK,
    );
    y -= 12.0;

    // Daily table
    add_text(&layer, &font_bold, "Daily Breakdown", MARGIN_LEFT, y, 12.0, COLOR_BLACK);
    y -= 7.0;
    add_table_header(&layer, &font_bold, y);
    y -= 5.0;

    let mut table_page = 1;
    for record in &report.daily_data {
        if y < MARGIN_BOTTOM {
            table_page += 1;
            let (page, page_layer) = doc.add_page(
                Mm(LETTER_WIDTH),
                Mm(LETTER_HEIGHT),
                format!("Table Page {}", table_page),
            );
            layer = doc.get_page(page).get_layer(page_layer);
            y = LETTER_HEIGHT - 20.0;
            add_table_header(&layer, &font_bold, y);
            y -= 5.0;
        }

        let row_color = progress_color(record.progress);
        let values = [
            record.date.to_string(),
            day_of_week_abbrev(record).to_string(),
            record.calorie_intake.to_string(),
            record.calorie_burned.to_string(),
            format!("{:+}", record.net_calories()),
            record.progress.as_str().to_string(),
        ];

        let mut col_x = MARGIN_LEFT;
        for (i, (value, width)) in values.iter().zip(TABLE_COLUMNS).enumerate() {
            let color = if i >= 4 { row_color } else { COLOR_BLACK };
            add_text(&layer, &font, value, col_x, y, 8.0, color);
            col_x += width;
        }
        y -= ROW_HEIGHT;
    }

    // Chart page (landscape)
    let (chart_page, chart_layer) = doc.add_page(Mm(LETTER_HEIGHT), Mm(LETTER_WIDTH), "Chart Page");
    let chart_layer = doc.get_page(chart_page).get_layer(chart_layer);
    let mut y2 = LETTER_WIDTH - 20.0;

    add_text(&chart_layer, &font_bold, "Calorie Trend", MARGIN_LEFT, y2, 16.0, COLOR_TITLE);
    add_text(&chart_layer, &font, &format!("{} - {}", start, end), 100.0, y2, 11.0, COLOR_BLACK);
    y2 -= 10.0;

    match render_trend_chart(&report.daily_data, 1000, 400) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes)
                .map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // 1000x400 px at 120 DPI is roughly 212mm x 85mm
            let transform = ImageTransform {
                translate_x: Some(Mm(MARGIN_LEFT)),
                translate_y: Some(Mm(y2 - 90.0)),
                dpi: Some(120.0),
                ..Default::default()
            };
            pdf_image.add_to_layer(chart_layer.clone(), transform);
            y2 -= 95.0;
        }
        Err(e) => {
            tracing::warn!(error = %e, "chart rendering failed");
            add_text(&chart_layer, &font, &format!("Chart generation error: {}", e), MARGIN_LEFT, y2 - 10.0, 9.0, COLOR_NEGATIVE);
            y2 -= 15.0;
        }
    }

    y2 -= 5.0;
    add_text(&chart_layer, &font_bold, "Legend:", MARGIN_LEFT, y2, 10.0, COLOR_BLACK);
    add_text(&chart_layer, &font, "Intake", 45.0, y2, 10.0, COLOR_NEGATIVE);
    add_text(&chart_layer, &font, "Burned", 75.0, y2, 10.0, COLOR_POSITIVE);
    add_text(&chart_layer, &font, "Positive day: burned >= intake", 110.0, y2, 10.0, COLOR_BLACK);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }

    let file = File::create(output_path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: &str, intake: i64, burned: i64) -> DailyRecord {
        DailyRecord::new(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(), intake, burned)
    }

    #[test]
    fn test_chart_rejects_empty_series() {
        assert!(render_trend_chart(&[], 200, 100).is_err());
    }

    #[test]
    fn test_weekday_abbrev() {
        assert_eq!(day_of_week_abbrev(&record("2024-01-01", 0, 0)), "Mon");
        assert_eq!(day_of_week_abbrev(&record("2024-01-07", 0, 0)), "Sun");
    }
}
