use crate::overhead::row::ServiceSample;
use thiserror::Error;

/// Tag the Gradle tooling layer puts around performance statistics output.
pub const STATISTICS_MARKER: &str = "<ij_msg_gr>Performance statistics<ij_msg_gr>";

/// Everything after this marker is the space-separated service record.
pub const SERVICE_MARKER: &str = "': service ";

const SERVICE_TOKEN: usize = 0;
const DURATION_TOKEN: usize = 4;

/// A line carried the statistics marker but not a usable service record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedStatisticsLine {
    #[error("statistics line has no `': service` field: {line:?}")]
    MissingServiceMarker { line: String },
    #[error("statistics line has {found} service tokens, need at least 5: {line:?}")]
    TooFewTokens { found: usize, line: String },
    #[error("statistics line has non-integer duration `{token}`: {line:?}")]
    InvalidDuration { token: String, line: String },
}

/// Parse one line of task output.
///
/// Returns `Ok(None)` for lines that are not performance statistics at all.
///
/// Expected layout after the service marker (single-space separated):
/// <service> <t1> <t2> <t3> <duration_ms> ...
///
/// Example:
/// ... <ij_msg_gr>Performance statistics<ij_msg_gr> ... ': service alpha x y z 120 tail
pub fn parse_statistics_line(
    line: &str,
) -> Result<Option<ServiceSample>, MalformedStatisticsLine> {
    if !line.contains(STATISTICS_MARKER) {
        return Ok(None);
    }

    // Host output chunks usually keep their terminator.
    let line = line.trim_end_matches(['\r', '\n']);

    let rest = match line.find(SERVICE_MARKER) {
        Some(at) => &line[at + SERVICE_MARKER.len()..],
        None => {
            return Err(MalformedStatisticsLine::MissingServiceMarker {
                line: line.to_string(),
            });
        }
    };

    let mut tokens: Vec<&str> = rest.split(' ').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    if tokens.len() <= DURATION_TOKEN {
        return Err(MalformedStatisticsLine::TooFewTokens {
            found: tokens.len(),
            line: line.to_string(),
        });
    }

    let token = tokens[DURATION_TOKEN];
    let duration_ms: u64 = token
        .parse()
        .map_err(|_| MalformedStatisticsLine::InvalidDuration {
            token: token.to_string(),
            line: line.to_string(),
        })?;

    Ok(Some(ServiceSample {
        service: tokens[SERVICE_TOKEN].to_string(),
        duration_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(service: &str, duration_ms: u64) -> Option<ServiceSample> {
        Some(ServiceSample {
            service: service.to_string(),
            duration_ms,
        })
    }

    #[test]
    fn ignores_lines_without_statistics_marker() {
        assert_eq!(parse_statistics_line(""), Ok(None));
        assert_eq!(parse_statistics_line("no marker here"), Ok(None));
        // The service marker alone is not enough.
        assert_eq!(
            parse_statistics_line("x': service alpha a b c 10"),
            Ok(None)
        );
    }

    #[test]
    fn extracts_service_and_fifth_token() {
        let line = "foo <ij_msg_gr>Performance statistics<ij_msg_gr> \
                    bar': service alpha x y z 120 tail";
        assert_eq!(parse_statistics_line(line), Ok(sample("alpha", 120)));
    }

    #[test]
    fn realistic_gradle_line() {
        let line = "2024-03-01 12:00:01 [INFO] <ij_msg_gr>Performance statistics<ij_msg_gr> \
                    Gradle model builder 'org.jetbrains.plugins.gradle.tooling.builder': service \
                    ProjectExtensionsDataBuilderImpl spent 3 ms 42 total";
        assert_eq!(
            parse_statistics_line(line),
            Ok(sample("ProjectExtensionsDataBuilderImpl", 42))
        );
    }

    #[test]
    fn strips_line_terminators() {
        let line = "<ij_msg_gr>Performance statistics<ij_msg_gr>': service beta a b c 7\r\n";
        assert_eq!(parse_statistics_line(line), Ok(sample("beta", 7)));
    }

    #[test]
    fn missing_service_marker_is_malformed() {
        let line = "<ij_msg_gr>Performance statistics<ij_msg_gr> service alpha a b c 7";
        assert!(matches!(
            parse_statistics_line(line),
            Err(MalformedStatisticsLine::MissingServiceMarker { .. })
        ));
    }

    #[test]
    fn too_few_tokens_is_malformed() {
        let line = "...<ij_msg_gr>Performance statistics<ij_msg_gr>...': service beta";
        assert_eq!(
            parse_statistics_line(line),
            Err(MalformedStatisticsLine::TooFewTokens {
                found: 1,
                line: line.to_string(),
            })
        );

        // Trailing separators do not count as tokens.
        let line = "<ij_msg_gr>Performance statistics<ij_msg_gr>': service beta a b c   ";
        assert!(matches!(
            parse_statistics_line(line),
            Err(MalformedStatisticsLine::TooFewTokens { found: 4, .. })
        ));
    }

    #[test]
    fn non_integer_duration_is_malformed() {
        for bad in ["12.5", "-3", "ms", "99999999999999999999999"] {
            let line = format!(
                "<ij_msg_gr>Performance statistics<ij_msg_gr>': service beta a b c {bad} x"
            );
            assert_eq!(
                parse_statistics_line(&line),
                Err(MalformedStatisticsLine::InvalidDuration {
                    token: bad.to_string(),
                    line: line.clone(),
                })
            );
        }
    }

    #[test]
    fn double_space_shifts_fields() {
        // Split is on single spaces, so an empty token occupies a slot.
        let line = "<ij_msg_gr>Performance statistics<ij_msg_gr>': service gamma  a b 5 9";
        assert_eq!(parse_statistics_line(line), Ok(sample("gamma", 5)));
    }

    #[test]
    fn error_message_names_the_problem() {
        let err = parse_statistics_line(
            "<ij_msg_gr>Performance statistics<ij_msg_gr>': service beta a",
        )
        .unwrap_err();
        assert!(err.to_string().contains("has 2 service tokens, need at least 5"));
    }
}
