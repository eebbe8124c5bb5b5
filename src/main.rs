use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_segments::SegmentsPlugin;

fn main() {
    serve_plugin(&SegmentsPlugin, MsgPackSerializer {})
}
