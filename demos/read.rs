use std::env;

fn main() {
    let db_path: String = env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/sample.dbc".to_string());

    match candb::from_file(&db_path) {
        Ok(outcome) => {
            for diagnostic in &outcome.diagnostics {
                eprintln!("warning: {diagnostic}");
            }

            let net = &outcome.network;
            println!("Version: {}", net.version);
            println!("Nodes: {:?}", net.nodes.keys().collect::<Vec<_>>());
            println!("Messages: {}", net.messages.len());
            for msg in net.messages.values() {
                println!(
                    "Message Name: {}\nid = {}\nsize = {}\ntransmitter = {}\n",
                    msg.name, msg.id, msg.size, msg.transmitter
                );
                for sig in msg.signals.values() {
                    println!(
                        "\tSignal Name: {}\n\tstart_bit = {}\n\tbit_size = {}\n\tfactor = {}\n\toffset = {}\n\tmin = {}\n\tmax = {}\n\tunit = {}\n",
                        sig.name,
                        sig.start_bit,
                        sig.bit_size,
                        sig.factor,
                        sig.offset,
                        sig.minimum,
                        sig.maximum,
                        sig.unit,
                    );

                    // Print value descriptions if present
                    if !sig.value_descriptions.is_empty() {
                        println!("\tValue Table:");
                        for (value, label) in &sig.value_descriptions {
                            println!("\t  {value} => {label}");
                        }
                    }
                }
                println!();
            }
        }
        Err(e) => eprintln!("Error: {e}"),
    }
}
