//! Error types for the exporter, built with `error-chain`.

error_chain! {
    foreign_links {
        Csv(::csv::Error);
        Hyper(::hyper::Error);
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }

    errors {
        // We could not connect to the Docker daemon.
        CouldNotConnect(host: String) {
            description("could not connect to Docker")
            display("could not connect to Docker at '{}'", host)
        }

        // We could not find the directory containing our certificates.
        NoCertPath {
            description("could not find DOCKER_CERT_PATH")
            display("could not find DOCKER_CERT_PATH")
        }

        // We could not parse a value returned by the Docker daemon.
        ParseError(type_name: &'static str, input: String) {
            description("error parsing JSON from Docker")
            display("error parsing JSON for {} from Docker: {}", type_name, input)
        }

        // The Docker host uses a URL scheme we don't know how to talk to.
        UnsupportedScheme(host: String) {
            description("unsupported Docker URL scheme")
            display("do not know how to connect to Docker at '{}'", host)
        }

        // The daemon or `DOCKER_API_VERSION` gave us a version we can't read.
        InvalidApiVersion(version: String) {
            description("invalid Docker API version")
            display("invalid Docker API version '{}'", version)
        }

        // A requested column is not one of the exportable columns.
        InvalidColumn(name: String, available: String) {
            description("invalid column name")
            display("Invalid column name: {}\nAvailable columns: {}", name, available)
        }

        // An image ID is too short to carry a `sha256:` prefix and short ID.
        MalformedImageId(id: String) {
            description("malformed image ID")
            display("malformed image ID '{}'", id)
        }

        // The CSV output file could not be created.
        CreateOutput(path: String) {
            description("failed to create CSV file")
            display("Failed to create CSV file {}", path)
        }

        // A header or data row could not be written.
        WriteOutput(what: &'static str) {
            description("failed to write CSV output")
            display("Failed to write {}", what)
        }
    }
}
