/// Returns a commented starter configuration.
pub fn generate_starter_config() -> String {
    r#"# cwingest configuration

input:
  # Log group names to poll. With log_group_prefix enabled each entry is a
  # prefix and every matching log group is polled.
  log_group:
    - /aws/rds/
  log_group_prefix: true

  # Where a log group seen for the first time starts reading:
  # beginning, end, or a number of seconds before now.
  start_position: beginning

  # Seconds to wait between polling passes.
  interval: 60

  # File holding the resume position of every log group. When omitted it is
  # derived from data_dir, $SINCEDB_DIR or $HOME.
  # sincedb_path: ~/.local/state/cwingest/sincedb

  # Message decoding: plain, json or json_lines.
  codec: plain

  # Fields and tags added to every event.
  # add_field:
  #   environment: production
  # tags: [cloudwatch]
  # type: cloudwatch_logs

  # What to do when a log group fails for a reason other than rate
  # limiting: skip (continue with the next group) or fail (stop).
  on_source_error: skip

api:
  endpoint: http://localhost:4566
  timeout_seconds: 30

output:
  buffer_limit: 1000
"#
    .to_string()
}
