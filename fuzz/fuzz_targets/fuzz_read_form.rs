#![no_main]

use std::convert::Infallible;

use bytes::Bytes;
use formbound::{FormOptions, FormReader};
use futures_util::stream::once;
use libfuzzer_sys::fuzz_target;
use tokio::runtime;

fuzz_target!(|data: &[u8]| {
    let rt = runtime::Builder::new_current_thread().build().expect("runtime");

    // Permissive limits: arbitrary input must only ever produce Ok or a
    // typed error, never a panic.
    let body = data.to_vec();
    let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(body)) });
    let reader = FormReader::with_options(
        stream,
        "X-BOUNDARY",
        FormOptions::new().multiple(true),
    );
    rt.block_on(async {
        let _ = reader.read_form().await;
    });

    // Tight limits: the bounded extractor must hold under the same input.
    let body = data.to_vec();
    let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(body)) });
    let reader = FormReader::with_options(
        stream,
        "X-BOUNDARY",
        FormOptions::new().multiple(true).max_field_size(64).max_file_size(256),
    );
    rt.block_on(async {
        let _ = reader.read_form().await;
    });
});
