use crate::error::Result;
use crate::models::{Forecast, ForecastField, Place};
use crate::utils::constants::EXPORT_FILE;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text export of saved forecasts: a `<place>:` line followed by one
/// comma-separated line per forecast column and a blank line.
#[derive(Debug, Default)]
pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn render<'a>(&self, entries: impl IntoIterator<Item = (&'a Place, &'a Forecast)>) -> String {
        let mut report = String::new();
        for (place, forecast) in entries {
            report.push_str(place);
            report.push_str(":\n");
            for field in ForecastField::ALL {
                report.push_str(&forecast.column(field).join(","));
                report.push('\n');
            }
            report.push('\n');
        }
        report
    }

    /// Write the report to `weather.txt` inside `dir`, returning its path.
    pub fn write_report<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a Place, &'a Forecast)>,
        dir: &Path,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXPORT_FILE);

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.render(entries).as_bytes())?;
        writer.flush()?;

        tracing::info!("Wrote forecast report to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyForecast;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn two_day_forecast() -> Forecast {
        Forecast {
            days: vec![
                DailyForecast {
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    high_temp: Some(78.1),
                    low_temp: Some(52.0),
                    max_wind: Some(9.8),
                    max_uv: Some(8.1),
                },
                DailyForecast {
                    date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                    high_temp: Some(80.4),
                    low_temp: Some(53.1),
                    max_wind: Some(11.2),
                    max_uv: None,
                },
            ],
        }
    }

    #[test]
    fn test_render_layout() {
        let place = "Napa".to_string();
        let forecast = two_day_forecast();

        let report = ReportWriter::new().render([(&place, &forecast)]);

        assert_eq!(
            report,
            "Napa:\n\
             2024-06-01,2024-06-02\n\
             78.1,80.4\n\
             52.0,53.1\n\
             9.8,11.2\n\
             8.1,-\n\
             \n"
        );
    }

    #[test]
    fn test_write_report() -> Result<()> {
        let dir = TempDir::new()?;
        let napa = "Napa".to_string();
        let sonoma = "Sonoma".to_string();
        let forecast = two_day_forecast();

        let path = ReportWriter::new()
            .write_report([(&napa, &forecast), (&sonoma, &forecast)], dir.path())?;

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("weather.txt"));
        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("Napa:\n"));
        assert!(content.contains("\n\nSonoma:\n"));
        Ok(())
    }
}
