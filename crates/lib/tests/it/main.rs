/*! Integration tests for genmap.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for key resolution and the Key/KeyBuf types
 * - cell: Tests for type-erased cells and their storage strategies
 * - pointer: Tests for the ownership wrapper
 * - lifetime: Tests for tracked values and borrow bookkeeping
 * - map: Tests for maps, views, copies and iteration
 *
 * Tests that do not pin a mode use `GENMAP_CHECK_MODE`, so the suite can be
 * run once per mode:
 * ```bash
 * cargo test
 * GENMAP_CHECK_MODE=unchecked cargo test
 * ```
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("genmap=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod lifetime;
mod map;
mod pointer;
