//! # CLI Module
//!
//! Command-line access to endpoint files and the binding pipeline.
//!
//! ## Commands
//!
//! ### `lint`
//!
//! Check an endpoint file and list every problem found:
//!
//! ```bash
//! brrtbind lint --schema endpoints.yaml
//! ```
//!
//! ### `routes`
//!
//! Print the endpoints of a file in match order:
//!
//! ```bash
//! brrtbind routes --schema endpoints.yaml
//! ```
//!
//! ### `bind`
//!
//! Run one request through the pipeline, with every endpoint answered by the
//! echo handler, and print the response:
//!
//! ```bash
//! brrtbind bind --schema endpoints.yaml --method POST --url '/users?notify=true' \
//!     -H 'x-api-key: secret' --body user.json --content-type application/json
//! ```
//!
//! Body size limits and request id handling follow the `BRRTB_*` runtime
//! environment variables; logging follows the `BRRTB_LOG_*` variables.

mod commands;


pub use commands::{echo_dispatcher, execute, parse_header_arg, run_cli, Cli, Commands};
