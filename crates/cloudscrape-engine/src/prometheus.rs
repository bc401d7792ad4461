//! Prometheus text exposition format.
//!
//! Renders metric families into the text format (version 0.0.4) served on
//! `/metrics`.

use std::fmt::Write;

use crate::samples::{MetricFamily, Sample};

/// Content type of [`render_prometheus`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render families in order, one `# HELP`/`# TYPE` header each.
pub fn render_prometheus(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for family in families {
        let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
        for sample in &family.samples {
            write_sample(&mut out, sample);
        }
    }
    out
}

fn write_sample(out: &mut String, sample: &Sample) {
    out.push_str(&sample.name);
    if !sample.label_names.is_empty() {
        out.push('{');
        for (i, (name, value)) in sample
            .label_names
            .iter()
            .zip(&sample.label_values)
            .enumerate()
        {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{name}=\"{}\"", escape_label_value(value));
        }
        out.push('}');
    }
    out.push(' ');
    out.push_str(&format_value(sample.value));
    if let Some(ts) = sample.timestamp_ms {
        let _ = write!(out, " {ts}");
    }
    out.push('\n');
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::MetricKind;

    fn labelled(name: &str, labels: &[(&str, &str)], value: f64) -> Sample {
        Sample {
            name: name.to_string(),
            label_names: labels.iter().map(|(n, _)| n.to_string()).collect(),
            label_values: labels.iter().map(|(_, v)| v.to_string()).collect(),
            value,
            timestamp_ms: None,
        }
    }

    #[test]
    fn render_empty() {
        assert_eq!(render_prometheus(&[]), "");
    }

    #[test]
    fn render_family_with_labels() {
        let family = MetricFamily::gauge(
            "aws_elb_request_count_average",
            "CloudWatch metric AWS/ELB RequestCount",
            vec![labelled(
                "aws_elb_request_count_average",
                &[("job", "aws_elb"), ("instance", ""), ("load_balancer_name", "myLB")],
                2.0,
            )],
        );
        let output = render_prometheus(&[family]);

        assert_eq!(
            output,
            "# HELP aws_elb_request_count_average CloudWatch metric AWS/ELB RequestCount\n\
             # TYPE aws_elb_request_count_average gauge\n\
             aws_elb_request_count_average{job=\"aws_elb\",instance=\"\",load_balancer_name=\"myLB\"} 2\n"
        );
    }

    #[test]
    fn render_unlabelled_counter_with_timestamp() {
        let mut sample = Sample::unlabelled("cloudwatch_requests_total", 12.0);
        sample.timestamp_ms = Some(1_700_000_000_000);
        let family = MetricFamily {
            name: "cloudwatch_requests_total".to_string(),
            kind: MetricKind::Counter,
            help: "API requests made to CloudWatch".to_string(),
            samples: vec![sample],
        };
        let output = render_prometheus(&[family]);

        assert!(output.contains("# TYPE cloudwatch_requests_total counter\n"));
        assert!(output.contains("cloudwatch_requests_total 12 1700000000000\n"));
    }

    #[test]
    fn escapes_label_values_and_help() {
        let family = MetricFamily::gauge(
            "m",
            "line one\nback\\slash",
            vec![labelled("m", &[("l", "a\"b\\c\nd")], 0.5)],
        );
        let output = render_prometheus(&[family]);

        assert!(output.contains("# HELP m line one\\nback\\\\slash\n"));
        assert!(output.contains("m{l=\"a\\\"b\\\\c\\nd\"} 0.5\n"));
    }

    #[test]
    fn special_float_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(1.5), "1.5");
    }
}
