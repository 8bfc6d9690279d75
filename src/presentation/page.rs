// Server-rendered dashboard page driving Chart.js
use axum::{
    http::header,
    response::{Html, IntoResponse},
};

pub async fn index() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Telemetry Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3.0.0/dist/chartjs-adapter-date-fns.bundle.min.js"></script>
    <style>
        :root { --bg: #f8fafc; --surface: #ffffff; --border: #e2e8f0; --text: #1e293b; --muted: #64748b; --accent: #17a2b8; }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); }
        .container { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
        header { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; margin-bottom: 1.5rem; }
        h1 { font-size: 1.25rem; font-weight: 600; }
        .controls { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: center; font-size: 0.875rem; }
        .controls input, .controls select, .controls button { padding: 0.4rem 0.6rem; border: 1px solid var(--border); border-radius: 0.375rem; background: var(--surface); }
        .status { color: var(--muted); font-size: 0.8rem; margin-bottom: 1rem; }
        .error { color: #b91c1c; }
        .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(480px, 1fr)); gap: 1rem; }
        .grid.focus { grid-template-columns: 1fr; }
        .card { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1rem; }
        .card h2 { font-size: 1rem; margin-bottom: 0.5rem; }
        .stats { display: flex; gap: 1rem; font-size: 0.8rem; color: var(--muted); margin-bottom: 0.5rem; }
        .stats b { color: var(--text); }
    </style>
</head>
<body>
<div class="container">
    <header>
        <h1>Telemetry Dashboard</h1>
        <div class="controls">
            <label>From <input type="date" id="start"></label>
            <label>To <input type="date" id="end"></label>
            <label><input type="checkbox" id="resample"> 1-min resample</label>
            <select id="focus"><option value="">All sensors</option></select>
            <button id="apply">Apply</button>
        </div>
    </header>
    <div class="status" id="status">Loading…</div>
    <div class="grid" id="grid"></div>
</div>
<script>
const charts = {};
let sensors = [];
let source = null;

function params() {
    const p = new URLSearchParams();
    const start = document.getElementById('start').value;
    const end = document.getElementById('end').value;
    if (start && end) { p.set('start_date', start); p.set('end_date', end); }
    p.set('resample', document.getElementById('resample').checked);
    return p.toString();
}

function fmt(v) { return Number.isFinite(v) ? v.toFixed(2) : '–'; }

function render(bundle) {
    const status = document.getElementById('status');
    const grid = document.getElementById('grid');
    const focus = document.getElementById('focus').value;
    grid.classList.toggle('focus', focus !== '');

    if (!bundle.data_available) {
        const message = document.createElement('span');
        message.className = 'error';
        message.textContent = 'No data: ' + (bundle.error || 'unknown error');
        status.replaceChildren(message);
    } else {
        status.textContent = 'Last update: ' + (bundle.last_update || '–');
    }

    for (const sensor of sensors) {
        const visible = focus === '' || focus === sensor.id;
        const stats = bundle.stats[sensor.id];
        const series = bundle.chart_data[sensor.id];
        let card = document.getElementById('card-' + sensor.id);
        if (!visible || !stats) { if (card) card.remove(); if (charts[sensor.id]) { charts[sensor.id].destroy(); delete charts[sensor.id]; } continue; }
        if (!card) {
            card = document.createElement('div');
            card.className = 'card';
            card.id = 'card-' + sensor.id;
            card.innerHTML = '<h2></h2><div class="stats"></div><canvas></canvas>';
            grid.appendChild(card);
        }
        const unit = sensor.unit ? ' (' + sensor.unit + ')' : '';
        card.querySelector('h2').textContent = sensor.name + unit;
        card.querySelector('.stats').innerHTML =
            'min <b>' + fmt(stats.min) + '</b> max <b>' + fmt(stats.max) + '</b> mean <b>' + fmt(stats.mean) +
            '</b> current <b>' + fmt(stats.current) + '</b>';
        const data = series ? series.timestamps.map((t, i) => ({ x: t, y: series.values[i] })) : [];
        if (charts[sensor.id]) {
            charts[sensor.id].data.datasets[0].data = data;
            charts[sensor.id].update('none');
        } else {
            charts[sensor.id] = new Chart(card.querySelector('canvas'), {
                type: 'line',
                data: { datasets: [{ label: sensor.name, data, borderColor: '#17a2b8', pointRadius: 0, borderWidth: 1.5 }] },
                options: { animation: false, parsing: true, scales: { x: { type: 'time' }, y: { title: { display: true, text: sensor.unit || 'Value' } } }, plugins: { legend: { display: false } } }
            });
        }
    }
}

function connect() {
    if (source) source.close();
    const focus = document.getElementById('focus').value;
    const path = focus ? '/api/sensors/' + encodeURIComponent(focus) : '/api/dashboard';
    fetch(path + '?' + params()).then(r => r.json()).then(render);
    source = new EventSource('/api/dashboard/stream?' + params());
    source.addEventListener('dashboard', e => render(JSON.parse(e.data)));
}

fetch('/api/sensors').then(r => r.json()).then(list => {
    sensors = list;
    const select = document.getElementById('focus');
    for (const s of list) {
        const opt = document.createElement('option');
        opt.value = s.id;
        opt.textContent = s.name;
        select.appendChild(opt);
    }
    document.getElementById('apply').addEventListener('click', connect);
    connect();
});
</script>
</body>
</html>
"##;
