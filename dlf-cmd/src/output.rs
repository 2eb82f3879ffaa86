//! Writing resolved series as CSV or JSON.

use crate::OutputArgs;
use chrono::NaiveDateTime;
use dlf_data::points::SeriesOutput;
use dlf_sldc::channel::{Channel, ChannelLoads, TOTAL_NAME};
use dlf_utils::dates::format_date;
use dlf_utils::periods::Period;
use log::info;
use std::fs::File;
use std::io::{self, Write};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_time(ts: &NaiveDateTime) -> String {
    ts.format(TIME_FORMAT).to_string()
}

fn format_load(value: f64) -> String {
    value.to_string()
}

fn channel_cells(loads: &ChannelLoads) -> impl Iterator<Item = String> + '_ {
    Channel::ALL.into_iter().map(|c| format_load(loads.get(c)))
}

fn header(leading: &[&str], trailing: &[&str]) -> Vec<String> {
    leading
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(TOTAL_NAME.to_lowercase()))
        .chain(Channel::ALL.into_iter().map(|c| c.key().to_string()))
        .chain(trailing.iter().map(|s| s.to_string()))
        .collect()
}

/// Write `series` as CSV with a header row matching its resolution.
pub fn write_csv<W: Write>(series: &SeriesOutput, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    match series {
        SeriesOutput::FiveMinute(points) => {
            wtr.write_record(header(&["time"], &[]))?;
            for p in points {
                let mut record = vec![format_time(&p.time), format_load(p.total_load)];
                record.extend(channel_cells(&p.channel_loads));
                wtr.write_record(&record)?;
            }
        }
        SeriesOutput::Hourly(points) => {
            wtr.write_record(header(&["hour"], &["samples"]))?;
            for p in points {
                let mut record = vec![format_time(&p.hour), format_load(p.total_load)];
                record.extend(channel_cells(&p.channel_loads));
                record.push(p.sample_count.to_string());
                wtr.write_record(&record)?;
            }
        }
        SeriesOutput::Daily(points) => {
            wtr.write_record(header(&["date", "label"], &["samples"]))?;
            for p in points {
                let mut record = vec![
                    format_date(&p.date),
                    p.label.clone(),
                    format_load(p.total_load),
                ];
                record.extend(channel_cells(&p.channel_loads));
                record.push(p.sample_count.to_string());
                wtr.write_record(&record)?;
            }
        }
        SeriesOutput::Merged(points) => {
            wtr.write_record(["time", "key", "predicted", "actual"])?;
            for p in points {
                wtr.write_record([
                    format_time(&p.time),
                    p.key.clone(),
                    format_load(p.predicted_load),
                    p.actual_load.map(format_load).unwrap_or_default(),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Neutral notice for a valid but empty result.
pub fn no_data_notice(period: &Period) -> String {
    format!(
        "No data available for {} to {}",
        format_time(&period.start),
        format_time(&period.end)
    )
}

/// Write `series` where `args` asks, or print the no-data notice.
pub fn emit(series: &SeriesOutput, period: &Period, args: &OutputArgs) -> anyhow::Result<()> {
    if series.is_empty() {
        println!("{}", no_data_notice(period));
        return Ok(());
    }
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    if args.json {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, series)?;
        writeln!(writer)?;
    } else {
        write_csv(series, writer)?;
    }
    if let Some(path) = &args.output {
        info!("Wrote {} points to {}", series.len(), path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dlf_data::points::{FiveMinutePoint, MergedPoint};
    use dlf_sldc::sample::LoadSample;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn csv_of(series: &SeriesOutput) -> String {
        let mut buf = Vec::new();
        write_csv(series, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn five_minute_csv() {
        let mut sample = LoadSample::total_only(at(14, 0), 100.0);
        sample.channel_loads.brpl = 40.0;
        let series = SeriesOutput::FiveMinute(vec![FiveMinutePoint::from(sample)]);
        let csv = csv_of(&series);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time,delhi,brpl,bypl,ndpl,ndmc,mes"));
        assert_eq!(lines.next(), Some("2024-01-15 14:00,100,40,0,0,0,0"));
    }

    #[test]
    fn merged_csv_leaves_missing_actuals_blank() {
        let series = SeriesOutput::Merged(vec![
            MergedPoint {
                time: at(9, 0),
                key: "09:00".to_string(),
                predicted_load: 3000.0,
                actual_load: Some(2990.0),
            },
            MergedPoint {
                time: at(9, 5),
                key: "09:05".to_string(),
                predicted_load: 3010.0,
                actual_load: None,
            },
        ]);
        let csv = csv_of(&series);
        assert_eq!(
            csv,
            "time,key,predicted,actual\n2024-01-15 09:00,09:00,3000,2990\n2024-01-15 09:05,09:05,3010,\n"
        );
    }

    #[test]
    fn notice_names_the_period() {
        let period = Period::day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(
            no_data_notice(&period),
            "No data available for 2024-01-15 00:00 to 2024-01-15 23:59"
        );
    }
}
