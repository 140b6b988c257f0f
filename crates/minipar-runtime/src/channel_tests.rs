use minipar_compiler::{analyze, parse};

use crate::error::RuntimeError;
use crate::interp::{Executor, Output};

fn run_source(source: &str) -> Result<String, RuntimeError> {
    let module = parse(source).expect("valid source");
    analyze(&module).expect("well-typed source");
    let (out, buffer) = Output::capture();
    Executor::with_output(out).run(&module)?;
    let buffer = buffer.lock().expect("capture buffer");
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// The expected idiom: the server channel blocks inside one par branch while
// the client connects from another. Every line below is causally ordered
// (banner before send, request log before reply, reply before the client
// prints), so the captured output is deterministic.
#[test]
fn channel_echo_round_trip() {
    let source = concat!(
        "func echo(s: string) -> string { return s }\n",
        "\n",
        "func serve() -> void {\n",
        "    s_channel srv { echo, \"ready\", \"127.0.0.1\", 47613 }\n",
        "}\n",
        "\n",
        "func talk() -> void {\n",
        "    sleep(0.5)\n",
        "    c_channel cli { \"127.0.0.1\", 47613 }\n",
        "    reply : string = cli.send(\"hi\")\n",
        "    print(reply)\n",
        "    cli.close()\n",
        "}\n",
        "\n",
        "par { serve() talk() }\n",
    );
    let output = run_source(source).unwrap();
    assert_eq!(output, "ready\nreceived: hi\nhi\n");
}

#[test]
fn channel_serves_multiple_requests() {
    let source = concat!(
        "func tag(s: string) -> string { return \"[\" + s + \"]\" }\n",
        "\n",
        "func serve() -> void {\n",
        "    s_channel srv { tag, \"tagger\", \"127.0.0.1\", 47629 }\n",
        "}\n",
        "\n",
        "func talk() -> void {\n",
        "    sleep(0.5)\n",
        "    c_channel cli { \"127.0.0.1\", 47629 }\n",
        "    print(cli.send(\"a\"))\n",
        "    print(cli.send(\"b\"))\n",
        "    cli.close()\n",
        "}\n",
        "\n",
        "par { serve() talk() }\n",
    );
    let output = run_source(source).unwrap();
    assert_eq!(
        output,
        "tagger\nreceived: a\n[a]\nreceived: b\n[b]\n"
    );
}

#[test]
fn send_on_a_closed_channel_fails() {
    use crate::channel::Connections;

    let connections = Connections::new();
    let err = connections.send("nowhere", "data").unwrap_err();
    assert!(err.message.contains("not open"), "{}", err.message);
    let err = connections.close("nowhere").unwrap_err();
    assert!(err.message.contains("not open"), "{}", err.message);
}

#[test]
fn connect_to_a_dead_port_is_a_runtime_error() {
    // Nothing listens on this port; the connect must surface as a runtime
    // error rather than a panic.
    let err = run_source("c_channel cli { \"127.0.0.1\", 47651 }").unwrap_err();
    assert!(err.message.contains("cannot connect"), "{}", err.message);
}
