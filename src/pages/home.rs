use std::time::Duration;

use leptos::prelude::*;
use log::warn;

use crate::components::agent_network::{
	AgentNetworkCanvas, Category, NetworkConfig, NodeSpec, NodeUpdate, Status, parse_node_specs,
};

const AGENTS_JSON: &str = include_str!("agents.json");
const TELEMETRY_PERIOD: Duration = Duration::from_secs(3);
const CANVAS_WIDTH: f64 = 960.0;
const CANVAS_HEIGHT: f64 = 480.0;

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// One round of fake telemetry for every agent.
fn telemetry_round(round: usize, agents: &[NodeSpec]) -> Vec<NodeUpdate> {
	agents
		.iter()
		.enumerate()
		.map(|(i, agent)| {
			let r = rand_simple(round * 31 + i * 7);
			let status = match r {
				r if r < 0.4 => Status::Processing,
				r if r < 0.7 => Status::Active,
				r if r < 0.92 => Status::Idle,
				_ => Status::Offline,
			};
			let load = (rand_simple(round * 17 + i * 13 + 5) * 100.0).round();
			NodeUpdate::new(agent.id.clone(), Some(status), Some(load))
		})
		.collect()
}

fn network_config() -> NetworkConfig {
	NetworkConfig {
		connect_radius: 340.0,
		..NetworkConfig::default()
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let agents = parse_node_specs(AGENTS_JSON);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{agents.map(|agents| view! { <AgentDashboard agents=agents /> })}
		</ErrorBoundary>
	}
}

#[component]
fn AgentDashboard(agents: Vec<NodeSpec>) -> impl IntoView {
	let (telemetry, set_telemetry) = signal(Vec::<NodeUpdate>::new());
	let (selected, set_selected) = signal(None::<String>);
	let round = StoredValue::new(0usize);

	let ids = agents.clone();
	match set_interval_with_handle(
		move || {
			round.update_value(|r| *r += 1);
			set_telemetry.set(telemetry_round(round.get_value(), &ids));
		},
		TELEMETRY_PERIOD,
	) {
		Ok(handle) => on_cleanup(move || handle.clear()),
		Err(err) => warn!("telemetry timer unavailable: {err:?}"),
	}

	let details = {
		let agents = agents.clone();
		move || {
			let id = selected.get()?;
			let agent = agents.iter().find(|a| a.id.as_str() == id)?;
			let latest = telemetry.with(|t| t.iter().find(|u| u.id.as_str() == id).cloned());
			let status = latest
				.as_ref()
				.and_then(|u| u.status)
				.unwrap_or(agent.status);
			let load = latest.and_then(|u| u.load).unwrap_or(agent.load);
			Some(view! {
				<div class="agent-panel">
					<h2>{agent.label.clone().unwrap_or_else(|| id.to_uppercase())}</h2>
					<p>{agent.category.label()}</p>
					<p>"Status: " {status.as_str()}</p>
					<p>{format!("Load: {load:.0}%")}</p>
				</div>
			})
		}
	};

	let nodes = Signal::derive(move || agents.clone());

	view! {
		<div class="network-frame">
			<AgentNetworkCanvas
				nodes=nodes
				config=network_config()
				telemetry=telemetry
				on_select=Callback::new(move |id: Option<String>| set_selected.set(id))
				width=Some(CANVAS_WIDTH)
				height=Some(CANVAS_HEIGHT)
			/>
			<div class="graph-overlay">
				<h1>"Agent Network"</h1>
				<p class="subtitle">"Hover to attract agents. Click an agent to inspect it."</p>
			</div>
			<div class="legend">
				{Category::ALL
					.into_iter()
					.map(|category| {
						view! {
							<div class="legend-item">
								<span
									class="legend-swatch"
									style=format!("background: {}", category.color())
								></span>
								<span>{category.label()}</span>
							</div>
						}
					})
					.collect_view()}
			</div>
			{details}
		</div>
	}
}
