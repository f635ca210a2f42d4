//! Page styles

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
    --yellow: #d29922;
    --purple: #a371f7;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px;
}

.container { max-width: 1400px; margin: 0 auto; }

header {
    display: flex;
    justify-content: space-between;
    align-items: flex-end;
    margin-bottom: 20px;
    padding-bottom: 16px;
    border-bottom: 1px solid var(--border);
}

h1 { font-size: 18px; font-weight: 600; color: var(--text-dim); }

.current-price { font-size: 36px; font-weight: 700; transition: color 0.3s; }
.current-price.positive { color: var(--green); }
.current-price.negative { color: var(--red); }

.price-change { font-size: 14px; color: var(--text-dim); }
.price-change.positive { color: var(--green); }
.price-change.negative { color: var(--red); }

.header-status { display: flex; align-items: center; gap: 8px; font-size: 13px; }
.last-update-label { color: var(--text-dim); margin-left: 12px; }

.status-dot { width: 10px; height: 10px; border-radius: 50%; display: inline-block; background: var(--text-dim); }
.status-dot.connecting { background: var(--yellow); }
.status-dot.connected { background: var(--green); }
.status-dot.error { background: var(--red); }

/* Controls */
.controls {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 16px;
}

.period-group { display: flex; gap: 6px; }

.period-btn {
    padding: 6px 12px;
    border-radius: 6px;
    border: 1px solid var(--border);
    background: var(--card);
    color: var(--text);
    font-size: 12px;
    cursor: pointer;
}

.period-btn.active { background: var(--blue); border-color: var(--blue); color: #fff; }

.overlay-group { display: flex; gap: 16px; font-size: 13px; color: var(--text-dim); }

/* Cards */
.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 16px;
}

.chart-card { margin-bottom: 16px; }
.price-chart { width: 100%; height: 520px; }

.card-header { margin-bottom: 12px; }

.card-title {
    font-size: 13px;
    color: var(--text-dim);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    gap: 16px;
}

/* Level lists */
.level-item {
    display: grid;
    grid-template-columns: 1.2fr 1fr 0.8fr;
    gap: 8px;
    padding: 6px 8px;
    border-left: 3px solid transparent;
    border-bottom: 1px solid var(--border);
    font-size: 13px;
}

.level-item:last-child { border-bottom: none; }
.level-item.support { border-left-color: var(--green); }
.level-item.resistance { border-left-color: var(--red); }
.level-item.pivot { border-left-color: var(--yellow); }
.level-item.error { border-left-color: var(--text-dim); }
.level-item.no-data { display: block; color: var(--text-dim); text-align: center; }

.level-label { color: var(--text-dim); }
.level-price { font-weight: 600; text-align: right; }
.level-distance { color: var(--text-dim); text-align: right; }
.level-note { grid-column: 1 / -1; font-size: 11px; color: var(--purple); }

/* Overlays */
.loading-overlay {
    position: fixed;
    inset: 0;
    background: rgba(13, 17, 23, 0.85);
    z-index: 10;
}

.error-toast {
    position: fixed;
    bottom: 20px;
    right: 20px;
    padding: 12px 16px;
    border-radius: 8px;
    background: rgba(248, 81, 73, 0.15);
    border: 1px solid var(--red);
    color: var(--red);
    z-index: 20;
}

@media (max-width: 700px) {
    .grid { grid-template-columns: 1fr; }
    header, .controls { flex-direction: column; align-items: flex-start; gap: 12px; }
}
";
