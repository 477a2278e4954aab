use super::*;

#[test]
fn buffer_sink_captures_lines_and_fragments() {
    let sink = buffer_sink();
    sink.print("a");
    sink.print("b");
    sink.println("c");
    assert_eq!(sink.get_output(), "abc\n");
    sink.clear();
    assert_eq!(sink.get_output(), "");
}

#[test]
fn non_capturing_sinks_report_nothing() {
    let sink = silent_sink();
    sink.println("dropped");
    assert_eq!(sink.get_output(), "");
    assert_eq!(stderr_sink().get_output(), "");
}
