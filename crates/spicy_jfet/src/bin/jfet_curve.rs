use clap::Parser;
use serde::Serialize;
use spicy_jfet::constants::CELSIUS_TO_KELVIN;
use spicy_jfet::devices::jfet::evaluate::{ChannelMode, Region};
use spicy_jfet::{JfetInstance, JfetModel, JfetType, ModelParams, SimulationConfig};

#[derive(Parser, Debug)]
#[command(
    about = "Sweeps the drain-source voltage of a single JFET and prints its DC operating points.",
    after_help = "Voltages and currents are printed with the sign of the terminals, so a P-channel sweep uses negative vds.",
    version
)]
struct Args {
    /// Threshold voltage (V).
    #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
    vto: f64,

    /// Transconductance parameter (A/V^2).
    #[arg(long, default_value_t = 1e-4)]
    beta: f64,

    /// Channel length modulation (1/V).
    #[arg(long, default_value_t = 0.0)]
    lambda: f64,

    /// Doping tail parameter.
    #[arg(long, default_value_t = 1.0)]
    b: f64,

    /// Gate saturation current (A).
    #[arg(long = "is", default_value_t = 1e-14)]
    sat_cur: f64,

    /// Use a P-channel model.
    #[arg(long)]
    pjf: bool,

    /// Gate-source voltages, one curve each.
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = [0.0, -0.5, -1.0]
    )]
    vgs: Vec<f64>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    vds_start: f64,

    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    vds_stop: f64,

    #[arg(long, default_value_t = 0.5)]
    vds_step: f64,

    /// Circuit temperature (C).
    #[arg(long, default_value_t = 27.0, allow_hyphen_values = true)]
    temp: f64,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CurvePoint {
    vgs: f64,
    vds: f64,
    id: f64,
    ig: f64,
    gm: f64,
    gds: f64,
    mode: ChannelMode,
    region: Region,
}

fn sweep(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop < start {
        return vec![start];
    }
    let count = ((stop - start) / step + 1e-9).floor() as usize;
    (0..=count).map(|i| start + i as f64 * step).collect()
}

fn main() {
    let args = Args::parse();

    let jfet_type = if args.pjf { JfetType::P } else { JfetType::N };
    let mut model = JfetModel::new("jcurve", jfet_type).with_params(ModelParams {
        vto: Some(args.vto),
        beta: Some(args.beta),
        lambda: Some(args.lambda),
        b: Some(args.b),
        is: Some(args.sat_cur),
        ..ModelParams::default()
    });
    model.add_instance(JfetInstance::new("j1", 1, 2, 0));

    let config = SimulationConfig {
        temp: args.temp + CELSIUS_TO_KELVIN,
        ..SimulationConfig::default()
    };
    for warning in model.temperature(&config) {
        eprintln!("warning: {warning}");
    }

    let sign = model.sign();
    let inst = &model.instances[0];
    let points: Vec<CurvePoint> = args
        .vgs
        .iter()
        .flat_map(|&vgs| {
            sweep(args.vds_start, args.vds_stop, args.vds_step)
                .into_iter()
                .map(move |vds| (vgs, vds))
        })
        .map(|(vgs, vds)| {
            let dc = model.dc_solution(inst, vgs, vds, config.gmin);
            CurvePoint {
                vgs,
                vds,
                id: sign * dc.cd,
                ig: sign * dc.cg,
                gm: dc.gm,
                gds: dc.gds,
                mode: dc.mode,
                region: dc.region,
            }
        })
        .collect();

    if args.json {
        match serde_json::to_string_pretty(&points) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize the sweep: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "{:>8} {:>8} {:>13} {:>13} {:>13} {:>13}  {:<8} {:<10}",
        "vgs", "vds", "id", "ig", "gm", "gds", "mode", "region"
    );
    for p in &points {
        println!(
            "{:>8.3} {:>8.3} {:>13.5e} {:>13.5e} {:>13.5e} {:>13.5e}  {:<8} {:<10}",
            p.vgs,
            p.vds,
            p.id,
            p.ig,
            p.gm,
            p.gds,
            format!("{:?}", p.mode),
            format!("{:?}", p.region)
        );
    }
}
