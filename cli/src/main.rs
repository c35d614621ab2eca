fn main() {
    taxi_meter_cli::run();
}
