//! Layout of the monthly report document.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::analysis::Summary;
use crate::builder::PdfBuilder;
use crate::charts::ChartPaths;
use crate::error::ReportError;
use crate::format::currency;
use crate::model::{Block, ImageBlock, ReportDocument, Section, TableBlock, TableColumn};
use crate::period::ReportPeriod;
use crate::richtext::Span;

/// Printable width of an A4 page between the default margins.
pub const CHART_WIDTH_MM: f64 = 190.0;

pub const STATISTICS_SECTION: &str = "Key Statistics";
pub const DAILY_REVENUE_SECTION: &str = "Daily Revenue";
pub const TOP_SUPPORTERS_SECTION: &str = "Top 10 Supporters";
pub const SUPPORTERS_CHART_SECTION: &str = "Top Supporters Visualization";

/// `donation_report_{year}_{month:02}.pdf`
pub fn report_file_name(period: &ReportPeriod) -> String {
    format!("donation_report_{}_{:02}.pdf", period.year(), period.month())
}

pub fn report_title(period: &ReportPeriod) -> String {
    format!("Monthly Donation Report - {}", period.label())
}

/// The five headline figures, as `(label, formatted value)` pairs.
pub fn statistics(summary: &Summary) -> Vec<(&'static str, String)> {
    vec![
        ("Total Supporters", summary.total_supporters.to_string()),
        ("Unique Supporters", summary.unique_supporters.to_string()),
        ("Total Donations", summary.total_donations.to_string()),
        ("Total Revenue", currency(summary.total_revenue)),
        ("Average Donation", currency(summary.average_donation)),
    ]
}

fn supporters_table(summary: &Summary) -> TableBlock {
    let columns = vec![
        TableColumn::new("Supporter Name", 6),
        TableColumn::new("Total Donated", 5),
        TableColumn::new("Donation Count", 4),
    ];
    summary
        .top_supporters
        .iter()
        .fold(TableBlock::new(columns), |table, supporter| {
            table.with_row([
                supporter.name.clone(),
                currency(supporter.total),
                supporter.count.to_string(),
            ])
        })
}

fn chart(path: &Path) -> Block {
    Block::Image(ImageBlock::new(path).with_width_mm(CHART_WIDTH_MM))
}

/// Assembles the report content for `summary` with the given chart images.
pub fn build_report_document(
    summary: &Summary,
    period: &ReportPeriod,
    charts: &ChartPaths,
) -> ReportDocument {
    let key_statistics = Section::new(STATISTICS_SECTION)
        .with_blocks(statistics(summary).into_iter().map(|(label, value)| {
            Block::paragraph(vec![Span::new(format!("{}: ", label)).bold(), Span::new(value)])
        }))
        .with_block(Block::Spacer(1.0));

    let daily_revenue = Section::new(DAILY_REVENUE_SECTION)
        .with_block(chart(&charts.daily_revenue))
        .with_block(Block::Spacer(1.0));

    let top_supporters = Section::builder(TOP_SUPPORTERS_SECTION)
        .start_on_new_page(true)
        .push_block(Block::Table(supporters_table(summary)))
        .push_block(Block::Spacer(0.5))
        .build();

    let supporters_chart =
        Section::new(SUPPORTERS_CHART_SECTION).with_block(chart(&charts.top_supporters));

    ReportDocument::new(report_title(period))
        .with_section(key_statistics)
        .with_section(daily_revenue)
        .with_section(top_supporters)
        .with_section(supporters_chart)
}

/// Renders the report PDF into `output_dir` and returns its path.
pub fn write_report(
    summary: &Summary,
    period: &ReportPeriod,
    charts: &ChartPaths,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let document = build_report_document(summary, period, charts);
    let pdf = PdfBuilder::new(document).render()?;

    fs::create_dir_all(output_dir).map_err(|source| ReportError::io(output_dir, source))?;
    let path = output_dir.join(report_file_name(period));
    pdf.write_to(&path)
        .map_err(|source| ReportError::io(&path, source))?;

    info!("Report generated successfully: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::record::{DonationRecord, SupporterId};

    fn period() -> ReportPeriod {
        ReportPeriod::new(2023, 1).unwrap()
    }

    fn summary() -> Summary {
        analyze(&[
            DonationRecord::new(SupporterId::number(1))
                .with_name("Ada")
                .with_amount(1234.5)
                .with_created_at("2023-01-05T10:00:00"),
            DonationRecord::new(SupporterId::number(2))
                .with_amount(99.0)
                .with_created_at("2023-01-06T10:00:00"),
        ])
    }

    #[test]
    fn file_name_pads_month() {
        assert_eq!(report_file_name(&period()), "donation_report_2023_01.pdf");
        let december = ReportPeriod::new(2023, 12).unwrap();
        assert_eq!(report_file_name(&december), "donation_report_2023_12.pdf");
    }

    #[test]
    fn statistics_format_currency() {
        let stats = statistics(&summary());
        assert_eq!(
            stats,
            vec![
                ("Total Supporters", "2".to_string()),
                ("Unique Supporters", "2".to_string()),
                ("Total Donations", "2".to_string()),
                ("Total Revenue", "$1,333.50".to_string()),
                ("Average Donation", "$666.75".to_string()),
            ]
        );
    }

    #[test]
    fn document_layout_follows_report_structure() {
        let charts = ChartPaths::for_period(Path::new("imgs"), &period());
        let document = build_report_document(&summary(), &period(), &charts);

        assert_eq!(document.title(), "Monthly Donation Report - January 2023");
        let titles: Vec<_> = document.sections().iter().map(Section::title).collect();
        assert_eq!(
            titles,
            vec![
                STATISTICS_SECTION,
                DAILY_REVENUE_SECTION,
                TOP_SUPPORTERS_SECTION,
                SUPPORTERS_CHART_SECTION
            ]
        );

        let table_section = document.section(TOP_SUPPORTERS_SECTION).unwrap();
        assert!(table_section.starts_on_new_page());
        let Some(Block::Table(table)) = table_section.blocks().get(1) else {
            panic!("supporters section should hold the table");
        };
        assert_eq!(
            table.rows(),
            &[
                vec!["Ada".to_string(), "$1,234.50".to_string(), "1".to_string()],
                vec!["Supporter 2".to_string(), "$99.00".to_string(), "1".to_string()],
            ]
        );

        let Some(Block::Image(image)) = document.section(DAILY_REVENUE_SECTION).unwrap().blocks().first() else {
            panic!("daily revenue section should start with the chart");
        };
        assert_eq!(image.path(), &charts.daily_revenue);
        assert_eq!(image.width_mm(), Some(CHART_WIDTH_MM));
    }

    #[test]
    fn statistics_paragraphs_bold_the_label() {
        let charts = ChartPaths::for_period(Path::new("imgs"), &period());
        let document = build_report_document(&summary(), &period(), &charts);
        let section = document.section(STATISTICS_SECTION).unwrap();
        let Some(Block::Paragraph(first)) = section.blocks().first() else {
            panic!("statistics start with a paragraph");
        };
        assert_eq!(
            first.spans(),
            [Span::new("Total Supporters: ").bold(), Span::new("2")]
        );
    }
}
