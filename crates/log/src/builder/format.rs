//! Format layer creation macros
//!
//! Each macro yields a boxed layer over `Registry`, so the timestamp toggle
//! can pick between differently-typed layers.

macro_rules! create_fmt_layer {
    ($format:ident, $display:expr, $writer:expr) => {{
        let layer = tracing_subscriber::fmt::layer()
            .$format()
            .with_writer($writer)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_thread_ids($display.thread_ids);

        if $display.time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    }};
}

macro_rules! create_json_layer {
    ($display:expr, $writer:expr) => {{
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer($writer)
            .with_current_span(true)
            .with_span_list($display.span_list)
            .flatten_event($display.flatten)
            .with_ansi(false)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_thread_ids($display.thread_ids);

        if $display.time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    }};
}
